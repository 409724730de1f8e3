//! Configuration for lsext.
//!
//! - [load]: locating, parsing and generating `lsext.toml` (see [Config]).
//! - [general]: toggles, sort key, format templates.
//! - [theme]: colors per semantic role.
//! - [symbols]: unit, suffix and VCS marker strings.
//!
//! Every setting has a built-in default. A missing or unreadable config file is never an error.

pub mod general;
pub mod load;
pub mod symbols;
pub mod theme;

pub use general::General;
pub use load::Config;
pub use symbols::Symbols;
pub use theme::{DateUnit, PermRole, SizeTier, SuffixKind, Theme, UserRole};
