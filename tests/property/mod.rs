//! Property-based tests for binding and chunked delivery

mod binding;
