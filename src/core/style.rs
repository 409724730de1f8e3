//! Terminal styling primitives for lsext.
//!
//! [ColorStyle] is the foreground/background pair every semantic role in the theme resolves to.
//! [colorize] turns text plus a style into SGR escape sequences, and [visible_width] measures how
//! many terminal columns such a string occupies once the escapes are stripped.
//!
//! Both functions run once per placeholder per entry, so they stay allocation-light and pure.

use serde::Deserialize;

/// SGR reset sequence appended after styled text and at the end of every row.
pub const RESET: &str = "\x1b[0m";

/// A 256-color foreground/background pair. Negative values mean "unset".
///
/// # Examples
/// ```toml
/// [theme.perm]
/// read = { fg = 3 }
/// write = { fg = 1, bg = 236 }
/// ```
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ColorStyle {
    fg: i16,
    bg: i16,
}

impl Default for ColorStyle {
    fn default() -> Self {
        ColorStyle::NONE
    }
}

impl ColorStyle {
    /// Neither color set. Still emits an explicit reset when painting.
    pub const NONE: ColorStyle = ColorStyle { fg: -1, bg: -1 };

    pub const fn new(fg: i16, bg: i16) -> Self {
        ColorStyle { fg, bg }
    }

    pub const fn fg(fg: i16) -> Self {
        ColorStyle { fg, bg: -1 }
    }

    /// The escape sequence that switches the terminal into this style.
    pub fn escape(&self) -> String {
        if self.fg < 0 && self.bg < 0 {
            return RESET.to_string();
        }

        let mut out = String::with_capacity(24);
        if self.fg >= 0 {
            out.push_str("\x1b[38;5;");
            out.push_str(&self.fg.to_string());
            out.push('m');
        }
        if self.bg >= 0 {
            out.push_str("\x1b[48;5;");
            out.push_str(&self.bg.to_string());
            out.push('m');
        }
        out
    }

    /// Styles `text` without closing the style, so more styled content can follow it.
    pub fn paint_open(&self, text: &str, enabled: bool) -> String {
        if !enabled {
            return text.to_string();
        }
        let mut out = self.escape();
        out.push_str(text);
        out
    }

    /// Styles `text` and closes it with a reset.
    pub fn paint(&self, text: &str, enabled: bool) -> String {
        if !enabled {
            return text.to_string();
        }
        let mut out = self.paint_open(text, enabled);
        out.push_str(RESET);
        out
    }
}

/// Applies `style` to `text` and closes it.
///
/// When colorization is disabled the input comes back untouched.
pub fn colorize(text: &str, style: ColorStyle, enabled: bool) -> String {
    style.paint(text, enabled)
}

/// Number of terminal columns `text` occupies.
///
/// SGR sequences (`ESC`, optional `[`, digits/`;`/`:`, `m`) count as zero. Every run of
/// non-ASCII characters counts as a single column, measured after the escapes are removed,
/// so an escape in the middle of a run does not split it.
pub fn visible_width(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut width = 0;
    let mut in_wide_run = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b == 0x1b
            && let Some(end) = escape_end(bytes, i)
        {
            i = end;
            continue;
        }

        if b >= 0x80 {
            if !in_wide_run {
                width += 1;
                in_wide_run = true;
            }
        } else {
            width += 1;
            in_wide_run = false;
        }
        i += 1;
    }

    width
}

/// Returns the index just past an SGR sequence starting at `start`, if there is one.
fn escape_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if bytes.get(j) == Some(&b'[') {
        j += 1;
    }
    while let Some(&c) = bytes.get(j) {
        if c.is_ascii_digit() || c == b';' || c == b':' {
            j += 1;
        } else {
            break;
        }
    }
    (bytes.get(j) == Some(&b'm')).then_some(j + 1)
}
