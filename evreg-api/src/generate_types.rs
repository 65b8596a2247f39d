//! TypeScript type generation.
//!
//! Exports TypeScript definitions for the request, response and model types
//! the admin frontend consumes. Runs as a test so `cargo test` keeps the
//! bindings current.
