//! Integration tests for the Draftline document synthesis engine

mod config_integration;
mod export_flow;
mod session_lifecycle;
pub mod test_utils;
