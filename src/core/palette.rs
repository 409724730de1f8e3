//! The `LS_COLORS` color table.
//!
//! Holds the `NAME=code` pairs supplied by the environment and resolves an entry name or a
//! two-letter [Indicator] code to a raw SGR escape. The table is read once at startup and shared
//! read-only between all render workers.

use crate::core::style::RESET;

use std::collections::HashMap;

/// Environment variable the color table is read from.
pub const LS_COLORS_ENV: &str = "LS_COLORS";

/// Two-letter semantic codes understood by `LS_COLORS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    File,
    Dir,
    Link,
    Orphan,
    Missing,
    Fifo,
    Socket,
    Block,
    Char,
    Door,
    Setuid,
    Setgid,
    Sticky,
    OtherWritable,
    StickyOtherWritable,
}

impl Indicator {
    pub fn code(self) -> &'static str {
        match self {
            Indicator::File => "fi",
            Indicator::Dir => "di",
            Indicator::Link => "ln",
            Indicator::Orphan => "or",
            Indicator::Missing => "mi",
            Indicator::Fifo => "pi",
            Indicator::Socket => "so",
            Indicator::Block => "bd",
            Indicator::Char => "cd",
            Indicator::Door => "do",
            Indicator::Setuid => "su",
            Indicator::Setgid => "sg",
            Indicator::Sticky => "st",
            Indicator::OtherWritable => "ow",
            Indicator::StickyOtherWritable => "tw",
        }
    }
}

/// Parsed color table. Lookups return complete escape sequences ready to prefix a name.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    enabled: bool,
    exact: HashMap<String, String>,
    ordered: Vec<(String, String)>,
}

impl Palette {
    /// A palette that never emits anything. Used when colorization is off.
    pub fn disabled() -> Self {
        Palette::default()
    }

    /// Reads `LS_COLORS`. A missing variable yields an empty, enabled table so that lookups fall
    /// back to explicit resets.
    pub fn from_env(enabled: bool) -> Self {
        if !enabled {
            return Palette::disabled();
        }
        match std::env::var(LS_COLORS_ENV) {
            Ok(spec) => Palette::parse(&spec),
            Err(_) => {
                log::debug!("{} not set, using terminal defaults", LS_COLORS_ENV);
                Palette::parse("")
            }
        }
    }

    /// Parses a `key=value:key=value` table. Tokens without `=` are ignored.
    pub fn parse(spec: &str) -> Self {
        let mut exact = HashMap::new();
        let mut ordered = Vec::new();

        for token in spec.split(':') {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            exact.insert(key.to_string(), value.to_string());
            ordered.push((key.to_string(), value.to_string()));
        }

        Palette {
            enabled: true,
            exact,
            ordered,
        }
    }

    /// Escape for a semantic indicator.
    pub fn indicator(&self, indicator: Indicator) -> String {
        self.lookup(indicator.code())
    }

    /// Resolves a file name or code: exact key, then the first matching glob, then `fi`, then a
    /// plain reset. Entries whose value is `target` are skipped.
    pub fn lookup(&self, name: &str) -> String {
        if !self.enabled {
            return String::new();
        }

        if let Some(code) = self.exact.get(name)
            && code != "target"
        {
            return sgr(code);
        }

        if let Some((_, code)) = self
            .ordered
            .iter()
            .find(|(pattern, _)| wildcard_match(pattern, name))
            && code != "target"
        {
            return sgr(code);
        }

        if let Some(code) = self.exact.get(Indicator::File.code()) {
            return sgr(code);
        }

        RESET.to_string()
    }
}

fn sgr(code: &str) -> String {
    format!("\x1b[{}m", code)
}

/// Case-sensitive glob match where `*` matches any run of characters, backtracking when a later
/// literal fails. Every other character matches itself.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            pi += 1;
            resume = ti;
        } else if pi < p.len() && p[pi] == t[ti] {
            pi += 1;
            ti += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            resume += 1;
            ti = resume;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
