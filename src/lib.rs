//! Internal library crate for lsext.
//!
//! The shipped application is the `lsext` binary (`src/main.rs`).
//!
//! This library exists to share code between the binary and the integration tests. It is not
//! considered a stable API for external use.

pub mod config;
pub mod core;
pub mod error;
pub mod utils;
