//! Color configuration for lsext.
//!
//! Every colored piece of output belongs to a semantic role: a permission character class, a size
//! tier, a date unit, a VCS state and so on. The [Theme] maps each role to a [ColorStyle] and is
//! read from the `[theme.*]` tables of `lsext.toml`. Lookups go through small closed enums rather
//! than strings, so adding a role is a compile error until every table knows about it.

use crate::core::style::ColorStyle;
use crate::core::vcs::VcsState;

use serde::Deserialize;

/// Character classes of the permission columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermRole {
    None,
    Read,
    Write,
    Exec,
    Dir,
    Link,
    Sticky,
    Special,
    Block,
    Unknown,
    Other,
    Full,
    ReadWrite,
    ReadExec,
    WriteExec,
}

impl PermRole {
    /// Role of one character of the `ls -l` style permission string.
    pub fn for_letter(c: char) -> PermRole {
        match c {
            'b' => PermRole::Block,
            'c' => PermRole::Special,
            's' => PermRole::Sticky,
            'l' => PermRole::Link,
            'd' => PermRole::Dir,
            '-' => PermRole::None,
            'r' => PermRole::Read,
            'w' => PermRole::Write,
            'x' | 't' => PermRole::Exec,
            '?' => PermRole::Unknown,
            _ => PermRole::Other,
        }
    }

    /// Role of one octal digit. Compound values get their own roles.
    pub fn for_digit(digit: u32) -> PermRole {
        match digit {
            0 => PermRole::None,
            1 => PermRole::Exec,
            2 => PermRole::Write,
            3 => PermRole::WriteExec,
            4 => PermRole::Read,
            5 => PermRole::ReadExec,
            6 => PermRole::ReadWrite,
            7 => PermRole::Full,
            _ => PermRole::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    User,
    Group,
    Separator,
}

/// Magnitude tiers of a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    Byte,
    Kilo,
    Mega,
    Giga,
    Tera,
    Peta,
}

impl SizeTier {
    pub const ALL: [SizeTier; 6] = [
        SizeTier::Byte,
        SizeTier::Kilo,
        SizeTier::Mega,
        SizeTier::Giga,
        SizeTier::Tera,
        SizeTier::Peta,
    ];
}

/// Units of a relative modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Sec,
    Min,
    Hour,
    Day,
    Week,
    Mon,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixKind {
    Exec,
    Dir,
    Link,
    Mountpoint,
}

/// Theme configuration options
///
/// # Examples
/// ```toml
/// [theme.perm]
/// read = { fg = 3 }
/// [theme.size]
/// number = { fg = 12 }
/// mega = { fg = 208 }
/// ```
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Theme {
    perm: PermColors,
    user: UserColors,
    size: SizeColors,
    date: DateColors,
    suffix: SuffixColors,
    git: GitColors,
}

impl Theme {
    pub fn perm(&self, role: PermRole) -> ColorStyle {
        let p = &self.perm;
        match role {
            PermRole::None => p.none,
            PermRole::Read => p.read,
            PermRole::Write => p.write,
            PermRole::Exec => p.exec,
            PermRole::Dir => p.dir,
            PermRole::Link => p.link,
            PermRole::Sticky => p.sticky,
            PermRole::Special => p.special,
            PermRole::Block => p.block,
            PermRole::Unknown => p.unknown,
            PermRole::Other => p.other,
            PermRole::Full => p.full,
            PermRole::ReadWrite => p.readwrite,
            PermRole::ReadExec => p.readexec,
            PermRole::WriteExec => p.writeexec,
        }
    }

    pub fn user(&self, role: UserRole) -> ColorStyle {
        match role {
            UserRole::User => self.user.user,
            UserRole::Group => self.user.group,
            UserRole::Separator => self.user.separator,
        }
    }

    pub fn size(&self, tier: SizeTier) -> ColorStyle {
        let s = &self.size;
        match tier {
            SizeTier::Byte => s.byte,
            SizeTier::Kilo => s.kilo,
            SizeTier::Mega => s.mega,
            SizeTier::Giga => s.giga,
            SizeTier::Tera => s.tera,
            SizeTier::Peta => s.peta,
        }
    }

    /// Fixed color of size numerals when `size_number_color` is on.
    pub fn size_number(&self) -> ColorStyle {
        self.size.number
    }

    pub fn date(&self, unit: DateUnit) -> ColorStyle {
        let d = &self.date;
        match unit {
            DateUnit::Sec => d.sec,
            DateUnit::Min => d.min,
            DateUnit::Hour => d.hour,
            DateUnit::Day => d.day,
            DateUnit::Week => d.week,
            DateUnit::Mon => d.mon,
            DateUnit::Year => d.year,
        }
    }

    /// Fixed color of date numerals when `date_number_color` is on.
    pub fn date_number(&self) -> ColorStyle {
        self.date.number
    }

    pub fn suffix(&self, kind: SuffixKind) -> ColorStyle {
        match kind {
            SuffixKind::Exec => self.suffix.exec,
            SuffixKind::Dir => self.suffix.dir,
            SuffixKind::Link => self.suffix.link,
            SuffixKind::Mountpoint => self.suffix.mountpoint,
        }
    }

    pub fn git(&self, state: VcsState) -> ColorStyle {
        let g = &self.git;
        match state {
            VcsState::Ignored => g.ignore,
            VcsState::Conflicted => g.conflict,
            VcsState::Modified => g.modified,
            VcsState::Renamed => g.renamed,
            VcsState::Added => g.added,
            VcsState::TypeChange => g.typechange,
            VcsState::Unreadable => g.unreadable,
            VcsState::Untracked => g.untracked,
            VcsState::Unchanged => g.unchanged,
            VcsState::DirDirty => g.dir_dirty,
            VcsState::DirClean => g.dir_clean,
            VcsState::RepoDirty => g.repo_dirty,
            VcsState::RepoClean => g.repo_clean,
            VcsState::RepoBare => g.repo_bare,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct PermColors {
    none: ColorStyle,
    read: ColorStyle,
    write: ColorStyle,
    exec: ColorStyle,
    dir: ColorStyle,
    link: ColorStyle,
    sticky: ColorStyle,
    special: ColorStyle,
    block: ColorStyle,
    unknown: ColorStyle,
    other: ColorStyle,
    full: ColorStyle,
    readwrite: ColorStyle,
    readexec: ColorStyle,
    writeexec: ColorStyle,
}

impl Default for PermColors {
    fn default() -> Self {
        PermColors {
            none: ColorStyle::fg(0),
            read: ColorStyle::fg(3),
            write: ColorStyle::fg(1),
            exec: ColorStyle::fg(2),
            dir: ColorStyle::fg(4),
            link: ColorStyle::fg(6),
            sticky: ColorStyle::fg(5),
            special: ColorStyle::fg(5),
            block: ColorStyle::fg(5),
            unknown: ColorStyle::fg(1),
            other: ColorStyle::fg(7),
            full: ColorStyle::fg(9),
            readwrite: ColorStyle::fg(11),
            readexec: ColorStyle::fg(10),
            writeexec: ColorStyle::fg(13),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct UserColors {
    user: ColorStyle,
    group: ColorStyle,
    separator: ColorStyle,
}

impl Default for UserColors {
    fn default() -> Self {
        UserColors {
            user: ColorStyle::fg(11),
            group: ColorStyle::fg(3),
            separator: ColorStyle::fg(0),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct SizeColors {
    number: ColorStyle,
    byte: ColorStyle,
    kilo: ColorStyle,
    mega: ColorStyle,
    giga: ColorStyle,
    tera: ColorStyle,
    peta: ColorStyle,
}

impl Default for SizeColors {
    fn default() -> Self {
        SizeColors {
            number: ColorStyle::fg(12),
            byte: ColorStyle::fg(4),
            kilo: ColorStyle::fg(4),
            mega: ColorStyle::fg(4),
            giga: ColorStyle::fg(4),
            tera: ColorStyle::fg(4),
            peta: ColorStyle::fg(4),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct DateColors {
    number: ColorStyle,
    sec: ColorStyle,
    min: ColorStyle,
    hour: ColorStyle,
    day: ColorStyle,
    week: ColorStyle,
    mon: ColorStyle,
    year: ColorStyle,
}

impl Default for DateColors {
    fn default() -> Self {
        DateColors {
            number: ColorStyle::fg(10),
            sec: ColorStyle::fg(2),
            min: ColorStyle::fg(2),
            hour: ColorStyle::fg(2),
            day: ColorStyle::fg(2),
            week: ColorStyle::fg(2),
            mon: ColorStyle::fg(2),
            year: ColorStyle::fg(2),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct SuffixColors {
    exec: ColorStyle,
    dir: ColorStyle,
    link: ColorStyle,
    mountpoint: ColorStyle,
}

impl Default for SuffixColors {
    fn default() -> Self {
        SuffixColors {
            exec: ColorStyle::fg(10),
            dir: ColorStyle::NONE,
            link: ColorStyle::NONE,
            mountpoint: ColorStyle::NONE,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct GitColors {
    ignore: ColorStyle,
    conflict: ColorStyle,
    modified: ColorStyle,
    renamed: ColorStyle,
    added: ColorStyle,
    typechange: ColorStyle,
    unreadable: ColorStyle,
    untracked: ColorStyle,
    unchanged: ColorStyle,
    dir_dirty: ColorStyle,
    dir_clean: ColorStyle,
    repo_dirty: ColorStyle,
    repo_clean: ColorStyle,
    repo_bare: ColorStyle,
}

impl Default for GitColors {
    fn default() -> Self {
        GitColors {
            ignore: ColorStyle::fg(0),
            conflict: ColorStyle::fg(1),
            modified: ColorStyle::fg(3),
            renamed: ColorStyle::fg(5),
            added: ColorStyle::fg(2),
            typechange: ColorStyle::fg(4),
            unreadable: ColorStyle::fg(9),
            untracked: ColorStyle::fg(8),
            unchanged: ColorStyle::fg(0),
            dir_dirty: ColorStyle::fg(1),
            dir_clean: ColorStyle::fg(0),
            repo_dirty: ColorStyle::fg(1),
            repo_clean: ColorStyle::fg(2),
            repo_bare: ColorStyle::fg(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_tables_keep_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let theme: Theme = toml::from_str(
            r#"
            [perm]
            read = { fg = 100 }
            [git]
            modified = { fg = 7, bg = 0 }
            "#,
        )?;
        assert_eq!(theme.perm(PermRole::Read), ColorStyle::fg(100));
        assert_eq!(theme.perm(PermRole::Write), ColorStyle::fg(1));
        assert_eq!(theme.git(VcsState::Modified), ColorStyle::new(7, 0));
        assert_eq!(theme.size_number(), ColorStyle::fg(12));
        Ok(())
    }

    #[test]
    fn digit_roles_are_compound() {
        assert_eq!(PermRole::for_digit(7), PermRole::Full);
        assert_eq!(PermRole::for_digit(6), PermRole::ReadWrite);
        assert_eq!(PermRole::for_digit(5), PermRole::ReadExec);
        assert_eq!(PermRole::for_digit(3), PermRole::WriteExec);
        assert_eq!(PermRole::for_digit(4), PermRole::Read);
        assert_eq!(PermRole::for_letter('S'), PermRole::Other);
        assert_eq!(PermRole::for_letter('t'), PermRole::Exec);
    }
}
