//! Rendering of a single directory entry.
//!
//! An [Entry] is built once per listed object from its name, path, optional [Stat] and optional
//! VCS flags. Construction resolves every color, suffix, link target and ownership name, then
//! renders each placeholder code used by the active template into a [Segment] exactly once.
//! Layout later only pads and concatenates those segments.
//!
//! A missing [Stat] produces a degraded entry: question marks everywhere and the orphan color.
//! Entries never fail.

use crate::config::{Config, DateUnit, PermRole, SizeTier, SuffixKind, UserRole};
use crate::core::format::{FormatSpec, Segment};
use crate::core::meta::{FileKind, IdCache, MetadataProvider, Stat, mode};
use crate::core::palette::{Indicator, Palette};
use crate::core::style::{ColorStyle, RESET, colorize, visible_width};
use crate::core::vcs::{VcsFlags, VcsState};

use chrono::{Local, TimeZone};

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Extension given to every directory, used when grouping by type.
pub const DIRECTORY_EXTENSION: &str = "directory";
/// Extension of names without a dot.
pub const UNKNOWN_EXTENSION: &str = "unknown";

/// Everything shared by the entries of one batch. Read-only and shared between workers.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub config: &'a Config,
    pub palette: &'a Palette,
    pub ids: &'a IdCache,
    pub provider: &'a dyn MetadataProvider,
    pub format: &'a FormatSpec,
    /// Reference time for relative ages, in unix seconds.
    pub now: i64,
}

/// A rendered directory entry.
#[derive(Debug, Clone)]
pub struct Entry {
    name: OsString,
    path: PathBuf,
    stat: Option<Stat>,
    extension: String,
    target: Option<String>,
    mountpoint: bool,
    segments: HashMap<char, Segment>,
}

impl Entry {
    pub fn new(
        name: OsString,
        path: PathBuf,
        stat: Option<Stat>,
        vcs: Option<VcsFlags>,
        ctx: &RenderContext,
    ) -> Entry {
        let display = name.to_string_lossy().into_owned();
        let vcs = stat.and(vcs);

        let deco = match &stat {
            Some(stat) => Decoration::resolve(&display, &path, stat, vcs, ctx),
            None => Decoration::degraded(ctx),
        };

        let is_dir = stat.is_some_and(|s| s.is_dir());
        let mut entry = Entry {
            extension: extension_of(&display, is_dir),
            name,
            path,
            stat,
            target: (!deco.target.is_empty()).then(|| deco.target.clone()),
            mountpoint: deco.mountpoint,
            segments: HashMap::with_capacity(ctx.format.codes().len()),
        };

        for &code in ctx.format.codes() {
            let segment = entry.render(code, &deco, &display, ctx);
            entry.segments.insert(code, segment);
        }

        entry
    }

    fn render(&self, code: char, deco: &Decoration, name: &str, ctx: &RenderContext) -> Segment {
        let config = ctx.config;
        let colors = config.colors();

        let mut text = match (code, &self.stat) {
            ('p', Some(stat)) => {
                let acl = ctx.provider.has_acl(&self.path, stat.kind());
                ls_perms(stat.mode, acl, config)
            }
            ('p', None) => color_perms("?????????? ", config),
            ('P', Some(stat)) => chmod_perms(stat.mode, config),
            ('P', None) => color_perms("???", config),
            ('u', _) => deco.user.clone(),
            ('g', _) => deco.group.clone(),
            ('U', _) => {
                let separator = colorize(
                    config.symbols().user_separator(),
                    config.theme().user(UserRole::Separator),
                    colors,
                );
                format!("{}{}{}", deco.user, separator, deco.group)
            }
            ('r', Some(stat)) => relative_time(stat.mtime, ctx.now, config).0,
            ('t', Some(stat)) => relative_time(stat.mtime, ctx.now, config).1,
            ('D', Some(stat)) => iso_time(stat.mtime, config).0,
            ('T', Some(stat)) => iso_time(stat.mtime, config).1,
            ('s', Some(stat)) => unit_conv(stat.size, config),
            ('r' | 't' | 'D' | 'T' | 's', None) => "?".to_string(),
            ('G', _) => deco.marker.clone(),
            ('f', _) => format!(
                "{}{}{}{}",
                deco.name(name),
                deco.suffix,
                deco.target_color,
                deco.target
            ),
            ('F', _) => format!("{}{}", deco.name(name), deco.suffix),
            (other, _) => other.to_string(),
        };

        if colors {
            text.push_str(RESET);
        }
        let width = visible_width(&text);
        Segment::new(text, width)
    }

    #[inline]
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.stat.is_some_and(|s| s.is_dir())
    }

    /// Modification time in unix seconds, 0 when unknown.
    pub fn modified(&self) -> i64 {
        self.stat.map_or(0, |s| s.mtime)
    }

    pub fn size(&self) -> u64 {
        self.stat.map_or(0, |s| s.size)
    }

    #[inline]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Link target, or the mount source of a mountpoint.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    #[inline]
    pub fn is_mountpoint(&self) -> bool {
        self.mountpoint
    }

    pub fn segment(&self, code: char) -> Option<&Segment> {
        self.segments.get(&code)
    }

    #[inline]
    pub fn segments(&self) -> &HashMap<char, Segment> {
        &self.segments
    }
}

/// Resolved decoration of an entry, computed once before its segments.
struct Decoration {
    color: String,
    suffix: String,
    target: String,
    target_color: String,
    marker: String,
    user: String,
    group: String,
    mountpoint: bool,
}

impl Decoration {
    fn degraded(ctx: &RenderContext) -> Self {
        let theme = ctx.config.theme();
        let colors = ctx.config.colors();

        Decoration {
            color: ctx.palette.indicator(Indicator::Orphan),
            suffix: ColorStyle::NONE.paint_open(" ", colors),
            target: String::new(),
            target_color: String::new(),
            marker: " ".to_string(),
            user: colorize("????", theme.user(UserRole::User), colors),
            group: colorize("????", theme.user(UserRole::Group), colors),
            mountpoint: false,
        }
    }

    fn resolve(
        name: &str,
        path: &Path,
        stat: &Stat,
        vcs: Option<VcsFlags>,
        ctx: &RenderContext,
    ) -> Self {
        let config = ctx.config;
        let general = config.general();
        let theme = config.theme();
        let symbols = config.symbols();
        let colors = config.colors();

        let mut deco = Decoration {
            color: get_color(ctx.palette, name, stat.mode),
            suffix: ColorStyle::NONE.paint_open(" ", colors),
            target: String::new(),
            target_color: String::new(),
            marker: " ".to_string(),
            user: colorize(
                &ctx.ids.user(stat.uid, ctx.provider, general.numeric_ids()),
                theme.user(UserRole::User),
                colors,
            ),
            group: colorize(
                &ctx.ids.group(stat.gid, ctx.provider, general.numeric_ids()),
                theme.user(UserRole::Group),
                colors,
            ),
            mountpoint: false,
        };

        if let Some(flags) = vcs {
            let state = VcsState::from_flags(flags, stat.is_dir());
            let style = theme.git(state);
            let overridden = if state.is_repo() {
                general.override_git_repo_color()
            } else {
                general.override_git_entry_color()
            };

            // Without colors an override has nothing to paint, so the marker stays.
            if overridden && colors {
                deco.color = style.escape();
            } else {
                deco.marker = colorize(symbols.git(state), style, colors);
            }
        }

        if stat.is_symlink() && !general.resolve_links() {
            deco.resolve_link(name, path, ctx);
        }

        if stat.is_dir() {
            deco.suffix = deco.directory_suffix(path, stat, ctx);
        } else if stat.mode & mode::S_IXUSR != 0 && !stat.is_symlink() {
            deco.suffix = theme
                .suffix(SuffixKind::Exec)
                .paint_open(symbols.suffix(SuffixKind::Exec), colors);
        }

        deco
    }

    /// Colors a symlink after the object it points to. A dangling link gets the orphan color and
    /// its target the missing color.
    fn resolve_link(&mut self, name: &str, path: &Path, ctx: &RenderContext) {
        let config = ctx.config;

        let target = match ctx.provider.read_link(path) {
            Ok(target) => target,
            Err(e) => {
                log::debug!("cannot read link {}: {}", path.display(), e);
                return;
            }
        };

        if config.general().list() {
            self.suffix = config
                .theme()
                .suffix(SuffixKind::Link)
                .paint_open(config.symbols().suffix(SuffixKind::Link), config.colors());
        }

        let shown = target.to_string_lossy().into_owned();
        let resolved = if target.is_absolute() {
            target
        } else {
            path.parent().unwrap_or(Path::new("")).join(&target)
        };

        match ctx.provider.lstat(&resolved) {
            Ok(tstat) => {
                self.color = get_color(ctx.palette, name, tstat.mode);
                self.target_color = get_color(ctx.palette, &shown, tstat.mode);
            }
            Err(_) => {
                self.color = ctx.palette.indicator(Indicator::Orphan);
                self.target_color = ctx.palette.indicator(Indicator::Missing);
            }
        }
        self.target = shown;
    }

    /// Directory suffix, or the mountpoint suffix when the directory sits on a device boundary
    /// with a known mount source. The source is then shown like a link target.
    fn directory_suffix(&mut self, path: &Path, stat: &Stat, ctx: &RenderContext) -> String {
        let config = ctx.config;
        let general = config.general();
        let colors = config.colors();

        if general.resolve_mounts()
            && general.list()
            && let Some(source) = mount_source(path, stat, ctx.provider)
        {
            self.target_color = match ctx.provider.stat(Path::new(&source)) {
                Ok(sstat) => get_color(ctx.palette, &source, sstat.mode),
                Err(_) => ctx.palette.indicator(Indicator::Char),
            };
            self.target = source;
            self.mountpoint = true;

            return config
                .theme()
                .suffix(SuffixKind::Mountpoint)
                .paint_open(config.symbols().suffix(SuffixKind::Mountpoint), colors);
        }

        config
            .theme()
            .suffix(SuffixKind::Dir)
            .paint_open(config.symbols().suffix(SuffixKind::Dir), colors)
    }

    /// The colored name, left open. Suffix and target follow in their own colors and the
    /// segment is closed once at the end.
    fn name(&self, name: &str) -> String {
        format!("{}{}", self.color, name)
    }
}

/// Mount source of `path` if it is the root of a filesystem other than its parent's.
fn mount_source(path: &Path, stat: &Stat, provider: &dyn MetadataProvider) -> Option<String> {
    let parent = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => path,
    };
    let parent = provider.stat(parent).ok()?;

    if stat.dev == parent.dev && stat.ino != parent.ino {
        return None;
    }
    provider.mount_source(stat.dev)
}

/// Color escape for a name of the given mode.
///
/// Special bits and file types win over the name patterns of the palette: setuid, setgid,
/// sticky, directory, block, char, fifo, symlink, socket, door, then the name lookup.
pub fn get_color(palette: &Palette, name: &str, bits: u32) -> String {
    let other_writable = bits & mode::S_IWOTH != 0;

    let indicator = if bits & mode::S_ISUID != 0 {
        Indicator::Setuid
    } else if bits & mode::S_ISGID != 0 {
        Indicator::Setgid
    } else if bits & mode::S_ISVTX != 0 {
        if other_writable {
            Indicator::StickyOtherWritable
        } else {
            Indicator::Sticky
        }
    } else {
        match FileKind::from_mode(bits) {
            FileKind::Directory if other_writable => Indicator::OtherWritable,
            FileKind::Directory => Indicator::Dir,
            FileKind::Block => Indicator::Block,
            FileKind::Char => Indicator::Char,
            FileKind::Fifo => Indicator::Fifo,
            FileKind::Symlink => Indicator::Link,
            FileKind::Socket => Indicator::Socket,
            FileKind::Door => Indicator::Door,
            FileKind::Regular | FileKind::Unknown => return palette.lookup(name),
        }
    };

    palette.indicator(indicator)
}

/// `ls -l` style permission string: type letter, three rwx triplets with the setuid, setgid and
/// sticky overlays, and a trailing `+` when an ACL is present. Every character is colored by
/// its class.
pub fn ls_perms(bits: u32, acl: bool, config: &Config) -> String {
    const RWX: [&str; 8] = ["---", "--x", "-w-", "-wx", "r--", "r-x", "rw-", "rwx"];

    let kind = FileKind::from_mode(bits);
    let mut perms: Vec<char> = Vec::with_capacity(11);
    perms.push(kind.letter());
    for shift in [6, 3, 0] {
        perms.extend(RWX[((bits >> shift) & 7) as usize].chars());
    }

    if bits & mode::S_ISUID != 0 {
        perms[3] = if bits & mode::S_IXUSR != 0 { 's' } else { 'S' };
    }
    if bits & mode::S_ISGID != 0 {
        perms[6] = if bits & mode::S_IXGRP != 0 { 's' } else { 'S' };
    }
    if bits & mode::S_ISVTX != 0 {
        perms[9] = if bits & mode::S_IXOTH != 0 { 't' } else { 'T' };
    }

    let acl = acl && kind != FileKind::Symlink;
    perms.push(if acl { '+' } else { ' ' });

    let perms: String = perms.into_iter().collect();
    color_perms(&perms, config)
}

/// Three octal permission digits, each colored by its value.
pub fn chmod_perms(bits: u32, config: &Config) -> String {
    let theme = config.theme();
    let colors = config.colors();

    [(bits >> 6) & 7, (bits >> 3) & 7, bits & 7]
        .into_iter()
        .map(|digit| {
            colorize(
                &digit.to_string(),
                theme.perm(PermRole::for_digit(digit)),
                colors,
            )
        })
        .collect()
}

fn color_perms(perms: &str, config: &Config) -> String {
    let theme = config.theme();
    let colors = config.colors();
    let mut buf = [0u8; 4];

    perms
        .chars()
        .map(|c| {
            colorize(
                c.encode_utf8(&mut buf),
                theme.perm(PermRole::for_letter(c)),
                colors,
            )
        })
        .collect()
}

/// Human readable size in powers of 1024.
///
/// Whole values print without decimals, others with one (the first decimal is truncated when
/// deciding). Sizes past the last tier fall back to a two-digit approximation marked with `?`.
pub fn unit_conv(size: u64, config: &Config) -> String {
    let theme = config.theme();
    let symbols = config.symbols();
    let colors = config.colors();
    let number_color = config.general().size_number_color();

    let mut value = size as f64;

    for tier in SizeTier::ALL {
        if value < 1024.0 {
            let numeral = if (value * 10.0) as u64 % 10 == 0 {
                format!("{}", value as u64)
            } else {
                format!("{:.1}", value)
            };

            let tier_style = theme.size(tier);
            let numeral_style = if number_color {
                theme.size_number()
            } else {
                tier_style
            };

            return colorize(&numeral, numeral_style, colors)
                + &colorize(symbols.size(tier), tier_style, colors);
        }
        value /= 1024.0;
    }

    format!("{}?", two_significant(value))
}

/// `%.2g` for the small range left after dividing past the last tier.
fn two_significant(value: f64) -> String {
    if value >= 10.0 {
        return format!("{:.0}", value);
    }
    let fixed = format!("{:.1}", value);
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Age of `mtime` relative to `now` as (count, unit).
///
/// Each unit has a lower threshold below which `<` is shown instead of a count. Counts are
/// carried from one unit to the next by integer division, so they truncate. An unknown
/// modification time (0) renders as `?`, `?`.
pub fn relative_time(mtime: i64, now: i64, config: &Config) -> (String, String) {
    if mtime == 0 {
        return ("?".to_string(), "?".to_string());
    }

    let delta = now - mtime;
    let mut rel = delta;
    let pair = |count: String, unit: DateUnit| date_pair(&count, unit, config);

    if delta < 10 {
        return pair("<".into(), DateUnit::Sec);
    }
    if delta < 45 {
        return pair(rel.to_string(), DateUnit::Sec);
    }

    rel /= 60;
    if delta < 60 {
        return pair("<".into(), DateUnit::Min);
    }
    if delta < 2700 {
        return pair(rel.to_string(), DateUnit::Min);
    }

    rel /= 60;
    if delta < 3600 {
        return pair("<".into(), DateUnit::Hour);
    }
    if delta < 64800 {
        return pair(rel.to_string(), DateUnit::Hour);
    }

    rel /= 24;
    if delta < 86400 {
        return pair("<".into(), DateUnit::Day);
    }
    if delta < 453600 {
        return pair(rel.to_string(), DateUnit::Day);
    }

    rel /= 7;
    if delta < 604800 {
        return pair("<".into(), DateUnit::Week);
    }
    if delta < 1814400 {
        return pair(rel.to_string(), DateUnit::Week);
    }

    rel /= 4;
    if delta < 2419200 {
        return pair("<".into(), DateUnit::Mon);
    }
    if delta < 29030400 {
        return pair(rel.to_string(), DateUnit::Mon);
    }

    rel /= 12;
    pair(rel.to_string(), DateUnit::Year)
}

fn date_pair(count: &str, unit: DateUnit, config: &Config) -> (String, String) {
    let theme = config.theme();
    let colors = config.colors();

    let unit_style = theme.date(unit);
    let count_style = if config.general().date_number_color() {
        theme.date_number()
    } else {
        unit_style
    };

    (
        colorize(count, count_style, colors),
        colorize(config.symbols().date(unit), unit_style, colors),
    )
}

/// Local `YYYY-MM-DD` and `HH:MM` of `mtime`.
pub fn iso_time(mtime: i64, config: &Config) -> (String, String) {
    let theme = config.theme();
    let colors = config.colors();

    let Some(time) = Local.timestamp_opt(mtime, 0).single() else {
        return ("?".to_string(), "?".to_string());
    };

    let date_style = theme.date(DateUnit::Year);
    let time_style = if config.general().date_number_color() {
        theme.date_number()
    } else {
        date_style
    };

    (
        colorize(&time.format("%Y-%m-%d").to_string(), date_style, colors),
        colorize(&time.format("%H:%M").to_string(), time_style, colors),
    )
}

/// Text after the last dot, `unknown` without one, `directory` for directories.
pub fn extension_of(name: &str, is_dir: bool) -> String {
    if is_dir {
        return DIRECTORY_EXTENSION.to_string();
    }
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_string(),
        None => UNKNOWN_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    fn plain() -> Config {
        Config::from_toml_str("[general]\ncolors = false").unwrap()
    }

    #[derive(Default)]
    struct FakeProvider {
        files: HashMap<PathBuf, Stat>,
        links: HashMap<PathBuf, PathBuf>,
        mount: Option<String>,
    }

    impl MetadataProvider for FakeProvider {
        fn lstat(&self, path: &Path) -> io::Result<Stat> {
            self.files
                .get(path)
                .copied()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
        fn stat(&self, path: &Path) -> io::Result<Stat> {
            self.lstat(path)
        }
        fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
            self.links
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))
        }
        fn user_name(&self, _: u32) -> Option<String> {
            Some("alice".to_string())
        }
        fn group_name(&self, _: u32) -> Option<String> {
            Some("staff".to_string())
        }
        fn has_acl(&self, _: &Path, _: FileKind) -> bool {
            false
        }
        fn mount_source(&self, _: u64) -> Option<String> {
            self.mount.clone()
        }
    }

    fn regular(perm: u32, size: u64, mtime: i64) -> Stat {
        Stat {
            mode: mode::S_IFREG | perm,
            size,
            mtime,
            ..Stat::default()
        }
    }

    #[test]
    fn unit_conv_tiers() {
        let config = plain();
        assert_eq!(unit_conv(0, &config), "0B");
        assert_eq!(unit_conv(1023, &config), "1023B");
        assert_eq!(unit_conv(1024, &config), "1K");
        assert_eq!(unit_conv(1536, &config), "1.5K");
        assert_eq!(unit_conv(1048576, &config), "1M");
        assert_eq!(unit_conv(5 * 1024 * 1024 * 1024, &config), "5G");
    }

    #[test]
    fn unit_conv_past_last_tier() {
        assert_eq!(unit_conv(u64::MAX, &plain()), "16?");
        assert_eq!(unit_conv(1u64 << 61, &plain()), "2?");
    }

    #[test]
    fn unit_conv_number_color_swaps_roles() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::from_toml_str(
            "[theme.size]\nnumber = { fg = 12 }\nkilo = { fg = 4 }\n",
        )?;
        assert_eq!(
            unit_conv(2048, &config),
            "\x1b[38;5;12m2\x1b[0m\x1b[38;5;4mK\x1b[0m"
        );

        let config = Config::from_toml_str("[general]\nsize_number_color = false")?;
        assert_eq!(
            unit_conv(2048, &config),
            "\x1b[38;5;4m2\x1b[0m\x1b[38;5;4mK\x1b[0m"
        );
        Ok(())
    }

    #[test]
    fn ls_perms_overlays() {
        let config = plain();
        assert_eq!(ls_perms(0o755, false, &config), "-rwxr-xr-x ");
        assert_eq!(ls_perms(mode::S_IFDIR | 0o1777, false, &config), "drwxrwxrwt ");
        assert_eq!(ls_perms(mode::S_IFDIR | 0o1776, false, &config), "drwxrwxrwT ");
        assert_eq!(ls_perms(0o4755, false, &config), "-rwsr-xr-x ");
        assert_eq!(ls_perms(0o4644, false, &config), "-rwSr--r-- ");
        assert_eq!(ls_perms(0o2755, false, &config), "-rwxr-sr-x ");
        assert_eq!(ls_perms(0o2745, false, &config), "-rwxr-Sr-x ");
        assert_eq!(ls_perms(0o644, true, &config), "-rw-r--r--+");
        assert_eq!(ls_perms(mode::S_IFLNK | 0o777, true, &config), "lrwxrwxrwx ");
    }

    #[test]
    fn ls_perms_colors_each_character() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::default();
        let perms = ls_perms(0o400, false, &config);
        assert_eq!(visible_width(&perms), 11);
        assert!(perms.starts_with("\x1b[38;5;0m-\x1b[0m\x1b[38;5;3mr\x1b[0m"));
        Ok(())
    }

    #[test]
    fn chmod_digits() {
        assert_eq!(chmod_perms(0o100754, &plain()), "754");
        let colored = chmod_perms(0o700, &Config::default());
        assert!(colored.starts_with("\x1b[38;5;9m7\x1b[0m"));
    }

    #[test]
    fn relative_time_boundaries() {
        let config = plain();
        let now = 1_000_000_000;
        let at = |delta: i64| {
            let (count, unit) = relative_time(now - delta, now, &config);
            format!("{}{}", count, unit)
        };

        assert_eq!(at(9), "<sec");
        assert_eq!(at(10), "10sec");
        assert_eq!(at(44), "44sec");
        assert_eq!(at(45), "<min");
        assert_eq!(at(59), "<min");
        assert_eq!(at(60), "1min");
        assert_eq!(at(2699), "44min");
        assert_eq!(at(2700), "<hour");
        assert_eq!(at(3599), "<hour");
        assert_eq!(at(3600), "1hour");
        assert_eq!(at(64800), "<day");
        assert_eq!(at(86400), "1day");
        assert_eq!(at(453600), "<week");
        assert_eq!(at(604800), "1week");
        assert_eq!(at(1814400), "<mon");
        assert_eq!(at(2419200), "1mon");
        assert_eq!(at(29030400), "1year");
    }

    #[test]
    fn unknown_mtime_is_question_marks() {
        assert_eq!(
            relative_time(0, 1_000, &plain()),
            ("?".to_string(), "?".to_string())
        );
    }

    #[test]
    fn iso_time_shape() {
        let (date, time) = iso_time(1_700_000_000, &plain());
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
        assert_eq!(time.len(), 5);
        assert_eq!(&time[2..3], ":");
    }

    #[test]
    fn extensions() {
        assert_eq!(extension_of("main.rs", false), "rs");
        assert_eq!(extension_of("archive.tar.gz", false), "gz");
        assert_eq!(extension_of("Makefile", false), UNKNOWN_EXTENSION);
        assert_eq!(extension_of("src.d", true), DIRECTORY_EXTENSION);
    }

    #[test]
    fn color_precedence() {
        let palette = Palette::parse("su=1:sg=2:st=3:tw=4:di=5:ow=6:*.rs=7:fi=8");
        assert_eq!(get_color(&palette, "a.rs", 0o4755), "\x1b[1m");
        assert_eq!(get_color(&palette, "a.rs", 0o2755), "\x1b[2m");
        assert_eq!(get_color(&palette, "d", mode::S_IFDIR | 0o1755), "\x1b[3m");
        assert_eq!(get_color(&palette, "d", mode::S_IFDIR | 0o1777), "\x1b[4m");
        assert_eq!(get_color(&palette, "d", mode::S_IFDIR | 0o755), "\x1b[5m");
        assert_eq!(get_color(&palette, "d", mode::S_IFDIR | 0o757), "\x1b[6m");
        assert_eq!(get_color(&palette, "a.rs", 0o644), "\x1b[7m");
        assert_eq!(get_color(&palette, "a.txt", 0o644), "\x1b[8m");
        assert_eq!(get_color(&Palette::disabled(), "a.rs", 0o644), "");
    }

    #[test]
    fn degraded_entry_renders_question_marks() {
        let config = plain();
        let palette = Palette::disabled();
        let ids = IdCache::new();
        let provider = FakeProvider::default();
        let format = FormatSpec::parse("@p|@P|@U|@r@t|@s|@D|@G|@f");
        let ctx = RenderContext {
            config: &config,
            palette: &palette,
            ids: &ids,
            provider: &provider,
            format: &format,
            now: 100,
        };

        let entry = Entry::new("gone".into(), PathBuf::from("gone"), None, None, &ctx);
        let text = |code| entry.segment(code).map(|s| s.text.clone()).unwrap_or_default();

        assert_eq!(text('p'), "?????????? ");
        assert_eq!(text('P'), "???");
        assert_eq!(text('U'), "????:????");
        assert_eq!(text('r'), "?");
        assert_eq!(text('t'), "?");
        assert_eq!(text('s'), "?");
        assert_eq!(text('D'), "?");
        assert_eq!(text('G'), " ");
        assert_eq!(text('f'), "gone ");
        assert_eq!(entry.extension(), UNKNOWN_EXTENSION);
    }

    #[test]
    fn entry_suffixes_and_links() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::from_toml_str("[general]\ncolors = false\nlist = true")?;
        let palette = Palette::disabled();
        let ids = IdCache::new();
        let mut provider = FakeProvider::default();
        provider.files.insert(PathBuf::from("d/real"), regular(0o644, 10, 50));
        provider
            .links
            .insert(PathBuf::from("d/link"), PathBuf::from("real"));
        provider
            .links
            .insert(PathBuf::from("d/dangling"), PathBuf::from("nowhere"));

        let format = FormatSpec::parse("@u @f");
        let ctx = RenderContext {
            config: &config,
            palette: &palette,
            ids: &ids,
            provider: &provider,
            format: &format,
            now: 100,
        };

        let exec = Entry::new(
            "run.sh".into(),
            PathBuf::from("d/run.sh"),
            Some(regular(0o755, 1, 1)),
            None,
            &ctx,
        );
        assert_eq!(exec.segment('f').map(|s| s.text.as_str()), Some("run.sh*"));
        assert_eq!(exec.segment('u').map(|s| s.text.as_str()), Some("alice"));

        let link_stat = Stat {
            mode: mode::S_IFLNK | 0o777,
            ..Stat::default()
        };
        let link = Entry::new(
            "link".into(),
            PathBuf::from("d/link"),
            Some(link_stat),
            None,
            &ctx,
        );
        assert_eq!(
            link.segment('f').map(|s| s.text.as_str()),
            Some("link -> real")
        );
        assert_eq!(link.target(), Some("real"));

        let dangling = Entry::new(
            "dangling".into(),
            PathBuf::from("d/dangling"),
            Some(link_stat),
            None,
            &ctx,
        );
        assert_eq!(dangling.target(), Some("nowhere"));

        let dir = Entry::new(
            "sub".into(),
            PathBuf::from("d/sub"),
            Some(Stat {
                mode: mode::S_IFDIR | 0o755,
                ..Stat::default()
            }),
            None,
            &ctx,
        );
        assert_eq!(dir.segment('f').map(|s| s.text.as_str()), Some("sub/"));
        assert_eq!(dir.extension(), DIRECTORY_EXTENSION);
        Ok(())
    }

    #[test]
    fn vcs_marker_and_override() -> Result<(), Box<dyn std::error::Error>> {
        let palette = Palette::disabled();
        let ids = IdCache::new();
        let provider = FakeProvider::default();
        let format = FormatSpec::parse("@G@F");
        let stat = regular(0o644, 1, 1);

        let config = Config::from_toml_str("[general]\ncolors = false")?;
        let ctx = RenderContext {
            config: &config,
            palette: &palette,
            ids: &ids,
            provider: &provider,
            format: &format,
            now: 100,
        };
        let entry = Entry::new(
            "a.rs".into(),
            PathBuf::from("a.rs"),
            Some(stat),
            Some(VcsFlags::MODIFIED | VcsFlags::TRACKED),
            &ctx,
        );
        assert_eq!(entry.segment('G').map(|s| s.text.as_str()), Some("~"));

        let config = Config::from_toml_str("[general]\noverride_git_entry_color = true")?;
        let ctx = RenderContext {
            config: &config,
            ..ctx
        };
        let entry = Entry::new(
            "a.rs".into(),
            PathBuf::from("a.rs"),
            Some(stat),
            Some(VcsFlags::MODIFIED),
            &ctx,
        );
        assert_eq!(
            entry.segment('G').map(|s| s.text.as_str()),
            Some(" \x1b[0m")
        );
        assert!(
            entry
                .segment('F')
                .is_some_and(|s| s.text.starts_with("\x1b[38;5;3ma.rs"))
        );
        Ok(())
    }

    #[test]
    fn mountpoint_shows_its_source() -> Result<(), Box<dyn std::error::Error>> {
        let config =
            Config::from_toml_str("[general]\ncolors = false\nlist = true\nresolve_mounts = true")?;
        let palette = Palette::disabled();
        let ids = IdCache::new();
        let mut provider = FakeProvider {
            mount: Some("/dev/sdb1".to_string()),
            ..FakeProvider::default()
        };
        let parent = Stat {
            mode: mode::S_IFDIR | 0o755,
            dev: 1,
            ino: 3,
            ..Stat::default()
        };
        provider.files.insert(PathBuf::from("mnt"), parent);

        let format = FormatSpec::parse("@f");
        let ctx = RenderContext {
            config: &config,
            palette: &palette,
            ids: &ids,
            provider: &provider,
            format: &format,
            now: 100,
        };
        let disk = Stat {
            dev: 2,
            ino: 5,
            ..parent
        };
        let entry = Entry::new("disk".into(), PathBuf::from("mnt/disk"), Some(disk), None, &ctx);
        assert!(entry.is_mountpoint());
        assert_eq!(entry.target(), Some("/dev/sdb1"));
        assert_eq!(
            entry.segment('f').map(|s| s.text.as_str()),
            Some("disk @ /dev/sdb1")
        );

        let same_device = Stat { dev: 1, ..disk };
        let entry = Entry::new(
            "sub".into(),
            PathBuf::from("mnt/sub"),
            Some(same_device),
            None,
            &ctx,
        );
        assert!(!entry.is_mountpoint());
        assert_eq!(entry.segment('f').map(|s| s.text.as_str()), Some("sub/"));
        Ok(())
    }

    #[test]
    fn link_chain_is_closed_once() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::from_toml_str("[general]\nlist = true")?;
        let palette = Palette::parse("fi=37:*.rs=33");
        let ids = IdCache::new();
        let mut provider = FakeProvider::default();
        provider
            .files
            .insert(PathBuf::from("d/real.rs"), regular(0o644, 1, 1));
        provider
            .links
            .insert(PathBuf::from("d/link"), PathBuf::from("real.rs"));

        let format = FormatSpec::parse("@f");
        let ctx = RenderContext {
            config: &config,
            palette: &palette,
            ids: &ids,
            provider: &provider,
            format: &format,
            now: 100,
        };
        let link_stat = Stat {
            mode: mode::S_IFLNK | 0o777,
            ..Stat::default()
        };
        let link = Entry::new("link".into(), PathBuf::from("d/link"), Some(link_stat), None, &ctx);

        let text = link.segment('f').map(|s| s.text.clone()).unwrap_or_default();
        assert_eq!(text, "\x1b[37mlink\x1b[0m -> \x1b[33mreal.rs\x1b[0m");
        assert!(text.ends_with(RESET));
        assert_eq!(visible_width(&text), "link -> real.rs".len());
        Ok(())
    }

    #[test]
    fn color_override_without_colors_keeps_marker() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::from_toml_str(
            "[general]\ncolors = false\noverride_git_entry_color = true\noverride_git_repo_color = true",
        )?;
        let palette = Palette::disabled();
        let ids = IdCache::new();
        let provider = FakeProvider::default();
        let format = FormatSpec::parse("@G@F");
        let ctx = RenderContext {
            config: &config,
            palette: &palette,
            ids: &ids,
            provider: &provider,
            format: &format,
            now: 100,
        };

        let entry = Entry::new(
            "a.rs".into(),
            PathBuf::from("a.rs"),
            Some(regular(0o644, 1, 1)),
            Some(VcsFlags::MODIFIED | VcsFlags::TRACKED),
            &ctx,
        );
        assert_eq!(entry.segment('G').map(|s| s.text.as_str()), Some("~"));
        assert_eq!(entry.segment('F').map(|s| s.text.as_str()), Some("a.rs "));

        let repo = Entry::new(
            "repo".into(),
            PathBuf::from("repo"),
            Some(Stat {
                mode: mode::S_IFDIR | 0o755,
                ..Stat::default()
            }),
            Some(VcsFlags::IS_REPO),
            &ctx,
        );
        assert_eq!(repo.segment('G').map(|s| s.text.as_str()), Some("@"));
        Ok(())
    }
}
