//! Core listing engine for lsext.
//!
//! - [style] and [palette]: escape sequences and `LS_COLORS`.
//! - [meta]: file metadata behind the [MetadataProvider] seam, plus the id name cache.
//! - [vcs]: git status per directory behind the [VcsProvider] seam.
//! - [format]: the `@` format language.
//! - [entry]: one rendered entry and its segment renderers.
//! - [layout]: sorting and row packing.
//! - [worker]: the pool entries are built on.
//! - [listing]: ties the above together per operand.

pub mod entry;
pub mod format;
pub mod layout;
pub mod listing;
pub mod meta;
pub mod palette;
pub mod style;
pub mod terminal;
pub mod vcs;
pub mod worker;

pub use entry::{Entry, RenderContext};
pub use format::{FormatSpec, Segment};
pub use layout::{Layout, SortKey, Sorter};
pub use listing::Lister;
pub use meta::{FileKind, IdCache, MetadataProvider, Stat, SystemProvider};
pub use palette::Palette;
pub use style::{ColorStyle, colorize, visible_width};
pub use vcs::{GitProvider, VcsFlags, VcsProvider, VcsState};
pub use worker::WorkerPool;
