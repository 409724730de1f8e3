//! Terminal geometry for lsext.
//!
//! The only thing the listing needs from the terminal is its width, used to fit grid columns.

use std::io::{self, IsTerminal};

/// Width of the terminal stdout is attached to, or 0 when stdout is not a terminal (piped or
/// redirected output). A width of 0 packs one entry per row.
pub fn terminal_width() -> usize {
    if !io::stdout().is_terminal() {
        return 0;
    }

    match crossterm::terminal::size() {
        Ok((columns, _)) => usize::from(columns),
        Err(e) => {
            log::debug!("cannot query terminal size: {}", e);
            0
        }
    }
}
