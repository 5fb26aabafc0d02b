//! Draftline: Template-Driven Document Synthesis
//!
//! Binds a short project description into a proposal, email or estimate
//! template and delivers the result incrementally through a cancellable
//! session, with clipboard and download export of whatever has been delivered.

pub mod binder;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod export;
pub mod logging;
pub mod session;
pub mod template;
pub mod types;
