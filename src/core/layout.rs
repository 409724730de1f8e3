//! Sorting and packing of a batch of rendered entries.
//!
//! [Sorter] orders entries (directories first, grouping by extension, then the sort key).
//! [Layout] measures the batch-wide column widths, expands every entry through the template and
//! packs the rows either one per line (list mode) or into a grid sized to the terminal.

use crate::config::General;
use crate::core::entry::Entry;
use crate::core::format::{ColumnWidths, FormatSpec};
use crate::core::style::RESET;

use serde::Deserialize;

use std::cmp::Ordering;

/// Primary sort key. Names ascend, times and sizes descend (newest and largest first).
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Modified,
    Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sorter {
    key: SortKey,
    reversed: bool,
    dirs_first: bool,
    group_by_type: bool,
}

impl Sorter {
    pub fn new(key: SortKey, reversed: bool, dirs_first: bool, group_by_type: bool) -> Self {
        Sorter {
            key,
            reversed,
            dirs_first,
            group_by_type,
        }
    }

    pub fn from_config(general: &General) -> Self {
        Sorter::new(
            general.sort(),
            general.reversed(),
            general.dirs_first(),
            general.group_by_type(),
        )
    }

    /// Directories first, then extension, then the key. `reversed` only flips the key.
    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        if self.dirs_first {
            match (a.is_dir(), b.is_dir()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }

        if self.group_by_type {
            let by_type = a.extension().cmp(b.extension());
            if by_type != Ordering::Equal {
                return by_type;
            }
        }

        let by_key = match self.key {
            SortKey::Name => a.name().cmp(b.name()),
            SortKey::Modified => b.modified().cmp(&a.modified()),
            SortKey::Size => b.size().cmp(&a.size()),
        };

        if self.reversed {
            by_key.reverse()
        } else {
            by_key
        }
    }

    /// Stable sort; equal entries keep their discovery order.
    pub fn sort(&self, entries: &mut [Entry]) {
        entries.sort_by(|a, b| self.compare(a, b));
    }
}

/// Number of grid columns: the forced count when set, else as many cells as fit, at least one.
pub fn column_count(cell_width: usize, terminal_width: usize, forced: usize) -> usize {
    if forced > 0 {
        return forced;
    }
    if cell_width == 0 {
        return 1;
    }
    (terminal_width / cell_width).max(1)
}

/// Per-code maximum segment width over the batch.
pub fn column_widths(entries: &[Entry], format: &FormatSpec) -> ColumnWidths {
    let mut widths = ColumnWidths::new();
    for entry in entries {
        for &code in format.codes() {
            if let Some(segment) = entry.segment(code) {
                widths.observe(code, segment.width);
            }
        }
    }
    widths
}

/// Row packing settings for one batch.
#[derive(Debug, Clone, Copy)]
pub struct Layout<'a> {
    format: &'a FormatSpec,
    list: bool,
    forced_columns: usize,
    terminal_width: usize,
    group_by_type: bool,
    colors: bool,
}

impl<'a> Layout<'a> {
    pub fn new(format: &'a FormatSpec, general: &General, terminal_width: usize) -> Self {
        Layout {
            format,
            list: general.list(),
            forced_columns: general.columns(),
            terminal_width,
            group_by_type: general.group_by_type(),
            colors: general.colors(),
        }
    }

    /// Output lines for an already sorted batch, without newlines.
    pub fn lines(&self, entries: &[Entry]) -> Vec<String> {
        if entries.is_empty() {
            return Vec::new();
        }

        let widths = column_widths(entries, self.format);
        let cell_width = self.format.row_width(&widths) + 1;
        let columns = if self.list {
            1
        } else {
            column_count(cell_width, self.terminal_width, self.forced_columns)
        };

        let mut lines = Vec::new();
        let mut row = String::new();
        let mut in_row = 0;
        let mut group: Option<&str> = None;

        for entry in entries {
            if self.group_by_type && group != Some(entry.extension()) {
                if in_row > 0 {
                    lines.push(self.finish(&mut row));
                    in_row = 0;
                }
                lines.push(entry.extension().to_string());
                group = Some(entry.extension());
            }

            let (text, width) = self.format.expand(entry.segments(), &widths);
            row.push_str(&text);
            if !self.list {
                row.push_str(&" ".repeat(cell_width.saturating_sub(width)));
            }
            in_row += 1;

            if in_row == columns {
                lines.push(self.finish(&mut row));
                in_row = 0;
            }
        }

        if in_row > 0 {
            lines.push(self.finish(&mut row));
        }

        lines
    }

    /// Trims trailing whitespace and closes the row with a reset.
    fn finish(&self, row: &mut String) -> String {
        let mut line = row.trim_end().to_string();
        if self.colors {
            line.push_str(RESET);
        }
        row.clear();
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_count_fits_terminal() {
        assert_eq!(column_count(5, 17, 0), 3);
        assert_eq!(column_count(6, 17, 0), 2);
        assert_eq!(column_count(40, 17, 0), 1);
        assert_eq!(column_count(40, 0, 0), 1);
        assert_eq!(column_count(5, 17, 4), 4);
    }

    #[test]
    fn sort_key_names() -> Result<(), Box<dyn std::error::Error>> {
        #[derive(Deserialize)]
        struct Wrapper {
            sort: SortKey,
        }
        let parsed: Wrapper = toml::from_str("sort = \"modified\"")?;
        assert_eq!(parsed.sort, SortKey::Modified);
        assert!(toml::from_str::<Wrapper>("sort = \"random\"").is_err());
        Ok(())
    }
}
