//! Miscellaneous utilities for lsext.
//!
//! [cli] holds the command-line arguments, [helpers] small path helpers used by the config
//! loader.

pub mod cli;
pub mod helpers;

pub use helpers::{get_home, shorten_home_path};
