//! Symbol strings for lsext.
//!
//! Units, suffixes and VCS markers are plain strings configured under `[symbols.*]`, independent
//! from their colors so they can be localized or swapped for glyphs.

use crate::config::theme::{DateUnit, SizeTier, SuffixKind};
use crate::core::vcs::VcsState;

use serde::Deserialize;

/// # Examples
/// ```toml
/// [symbols.date]
/// min = "m"
/// hour = "h"
/// [symbols.suffix]
/// link = " → "
/// ```
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Symbols {
    user: UserSymbols,
    suffix: SuffixSymbols,
    size: SizeSymbols,
    date: DateSymbols,
    git: GitSymbols,
}

impl Symbols {
    pub fn user_separator(&self) -> &str {
        &self.user.separator
    }

    pub fn suffix(&self, kind: SuffixKind) -> &str {
        match kind {
            SuffixKind::Exec => &self.suffix.exec,
            SuffixKind::Dir => &self.suffix.dir,
            SuffixKind::Link => &self.suffix.link,
            SuffixKind::Mountpoint => &self.suffix.mountpoint,
        }
    }

    pub fn size(&self, tier: SizeTier) -> &str {
        let s = &self.size;
        match tier {
            SizeTier::Byte => &s.byte,
            SizeTier::Kilo => &s.kilo,
            SizeTier::Mega => &s.mega,
            SizeTier::Giga => &s.giga,
            SizeTier::Tera => &s.tera,
            SizeTier::Peta => &s.peta,
        }
    }

    pub fn date(&self, unit: DateUnit) -> &str {
        let d = &self.date;
        match unit {
            DateUnit::Sec => &d.sec,
            DateUnit::Min => &d.min,
            DateUnit::Hour => &d.hour,
            DateUnit::Day => &d.day,
            DateUnit::Week => &d.week,
            DateUnit::Mon => &d.mon,
            DateUnit::Year => &d.year,
        }
    }

    pub fn git(&self, state: VcsState) -> &str {
        let g = &self.git;
        match state {
            VcsState::Ignored => &g.ignore,
            VcsState::Conflicted => &g.conflict,
            VcsState::Modified => &g.modified,
            VcsState::Renamed => &g.renamed,
            VcsState::Added => &g.added,
            VcsState::TypeChange => &g.typechange,
            VcsState::Unreadable => &g.unreadable,
            VcsState::Untracked => &g.untracked,
            VcsState::Unchanged => &g.unchanged,
            VcsState::DirDirty => &g.dir_dirty,
            VcsState::DirClean => &g.dir_clean,
            VcsState::RepoDirty => &g.repo_dirty,
            VcsState::RepoClean => &g.repo_clean,
            VcsState::RepoBare => &g.repo_bare,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct UserSymbols {
    separator: String,
}

impl Default for UserSymbols {
    fn default() -> Self {
        UserSymbols {
            separator: ":".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct SuffixSymbols {
    exec: String,
    dir: String,
    link: String,
    mountpoint: String,
}

impl Default for SuffixSymbols {
    fn default() -> Self {
        SuffixSymbols {
            exec: "*".into(),
            dir: "/".into(),
            link: " -> ".into(),
            mountpoint: " @ ".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct SizeSymbols {
    byte: String,
    kilo: String,
    mega: String,
    giga: String,
    tera: String,
    peta: String,
}

impl Default for SizeSymbols {
    fn default() -> Self {
        SizeSymbols {
            byte: "B".into(),
            kilo: "K".into(),
            mega: "M".into(),
            giga: "G".into(),
            tera: "T".into(),
            peta: "P".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct DateSymbols {
    sec: String,
    min: String,
    hour: String,
    day: String,
    week: String,
    mon: String,
    year: String,
}

impl Default for DateSymbols {
    fn default() -> Self {
        DateSymbols {
            sec: "sec".into(),
            min: "min".into(),
            hour: "hour".into(),
            day: "day".into(),
            week: "week".into(),
            mon: "mon".into(),
            year: "year".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct GitSymbols {
    ignore: String,
    conflict: String,
    modified: String,
    renamed: String,
    added: String,
    typechange: String,
    unreadable: String,
    untracked: String,
    unchanged: String,
    dir_dirty: String,
    dir_clean: String,
    repo_dirty: String,
    repo_clean: String,
    repo_bare: String,
}

impl Default for GitSymbols {
    fn default() -> Self {
        GitSymbols {
            ignore: "!".into(),
            conflict: "X".into(),
            modified: "~".into(),
            renamed: "R".into(),
            added: "+".into(),
            typechange: "T".into(),
            unreadable: "-".into(),
            untracked: "?".into(),
            unchanged: " ".into(),
            dir_dirty: "!".into(),
            dir_clean: " ".into(),
            repo_dirty: "!".into(),
            repo_clean: "@".into(),
            repo_bare: "+".into(),
        }
    }
}
