//! The main config loading module for lsext.
//!
//! Handles loading and deserializing settings from `lsext.toml`.
//!
//! Provides the main [Config] struct and the internal [RawConfig] used for parsing. Also writes a
//! default config file for `lsext --init`.

use crate::config::{General, Symbols, Theme};
use crate::utils::cli::Args;
use crate::utils::{get_home, shorten_home_path};

use serde::Deserialize;
use std::{fs, io, path::PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "LSEXT_CONFIG";

/// Raw configuration as read from the toml file.
/// Every table is optional and falls back to the internal defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct RawConfig {
    general: General,
    theme: Theme,
    symbols: Symbols,
}

/// Main configuration struct for lsext.
/// Built once at startup and shared read-only by every render worker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    general: General,
    theme: Theme,
    symbols: Symbols,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            general: raw.general,
            theme: raw.theme,
            symbols: raw.symbols,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    /// A missing or malformed file yields the internal defaults; neither is reported to the user.
    pub fn load() -> Self {
        let path = Self::default_path();

        if !path.exists() {
            log::info!("no config at {}, using internal defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("cannot read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parses a complete config document.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawConfig>(content).map(Config::from)
    }

    /// Folds command-line flags into the loaded settings.
    pub fn apply_args(&mut self, args: &Args) {
        self.general.apply_args(args);
    }

    // Getters

    #[inline]
    pub fn general(&self) -> &General {
        &self.general
    }

    #[inline]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    #[inline]
    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    #[inline]
    pub fn colors(&self) -> bool {
        self.general.colors()
    }

    /// Determine the configuration file path.
    /// Checks the LSEXT_CONFIG environment variable first,
    /// then XDG_CONFIG_HOME, then ~/.config/lsext/lsext.toml,
    /// and finally ./lsext.toml.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config).join("lsext/lsext.toml");
            if path.exists() {
                return path;
            }
        }

        if let Some(home) = get_home() {
            let path = home.join(".config/lsext/lsext.toml");
            if path.exists() {
                return path;
            }
        }
        PathBuf::from("lsext.toml")
    }

    /// Path `--init` writes to: the override variable, else the XDG location.
    pub fn init_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("lsext/lsext.toml");
        }
        match get_home() {
            Some(home) => home.join(".config/lsext/lsext.toml"),
            None => PathBuf::from("lsext.toml"),
        }
    }

    /// Generate a default configuration file at the specified path.
    /// If the file already exists, returns an error.
    pub fn generate_default(path: &PathBuf, minimal: bool) -> io::Result<()> {
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {:?}", path),
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = if minimal { MINIMAL_TOML } else { FULL_TOML };

        fs::write(path, content)?;
        println!(
            "{} default config generated at {}",
            if minimal { "Minimal" } else { "Full" },
            shorten_home_path(path)
        );
        Ok(())
    }
}

const MINIMAL_TOML: &str = r##"# lsext.toml - minimal configuration
# Only a few basic options. The rest uses internal defaults.
# Run `lsext --init-full` for a file listing every option.

[general]
dirs_first = true
show_hidden = false
list = false
format = "@p @U @^r@t @^s @G@f"
"##;

const FULL_TOML: &str = r##"# lsext.toml - default configuration for lsext
#
# Commented values are the internal defaults.
# Colors are 256-color indices; -1 leaves the color unset.

[general]
# colors = true
# list = false
# show_hidden = false
# resolve_links = false
# resolve_mounts = true
# resolve_repos = true
# numeric_ids = false
# reversed = false
# dirs_first = true
# group_by_type = false
# sort = "name"                 # "name", "modified" or "size"
# size_number_color = true
# date_number_color = true
# override_git_repo_color = false
# override_git_entry_color = false
# columns = 0                   # 0 = fit the terminal width

# Format placeholders:
#   @p permissions   @P octal permissions
#   @u user          @g group          @U user:group
#   @r relative age  @t age unit       @D date    @T time
#   @s size          @G git marker
#   @f name + suffix + link target     @F name + suffix
#   @^x right-aligns a column, @@ is a literal @
# format = "@p @U @^r@t @^s @G@f"
# grid_format = "@G@F"

# [theme.perm]
# none = { fg = 0 }
# read = { fg = 3 }
# write = { fg = 1 }
# exec = { fg = 2 }
# dir = { fg = 4 }
# link = { fg = 6 }
# sticky = { fg = 5 }
# special = { fg = 5 }
# block = { fg = 5 }
# unknown = { fg = 1 }
# other = { fg = 7 }
# full = { fg = 9 }
# readwrite = { fg = 11 }
# readexec = { fg = 10 }
# writeexec = { fg = 13 }

# [theme.user]
# user = { fg = 11 }
# group = { fg = 3 }
# separator = { fg = 0 }

# [theme.size]
# number = { fg = 12 }
# byte = { fg = 4 }
# kilo = { fg = 4 }
# mega = { fg = 4 }
# giga = { fg = 4 }
# tera = { fg = 4 }
# peta = { fg = 4 }

# [theme.date]
# number = { fg = 10 }
# sec = { fg = 2 }
# min = { fg = 2 }
# hour = { fg = 2 }
# day = { fg = 2 }
# week = { fg = 2 }
# mon = { fg = 2 }
# year = { fg = 2 }

# [theme.suffix]
# exec = { fg = 10 }
# dir = {}
# link = {}
# mountpoint = {}

# [theme.git]
# ignore = { fg = 0 }
# conflict = { fg = 1 }
# modified = { fg = 3 }
# renamed = { fg = 5 }
# added = { fg = 2 }
# typechange = { fg = 4 }
# unreadable = { fg = 9 }
# untracked = { fg = 8 }
# unchanged = { fg = 0 }
# dir_dirty = { fg = 1 }
# dir_clean = { fg = 0 }
# repo_dirty = { fg = 1 }
# repo_clean = { fg = 2 }
# repo_bare = { fg = 4 }

# [symbols.user]
# separator = ":"

# [symbols.suffix]
# exec = "*"
# dir = "/"
# link = " -> "
# mountpoint = " @ "

# [symbols.size]
# byte = "B"
# kilo = "K"
# mega = "M"
# giga = "G"
# tera = "T"
# peta = "P"

# [symbols.date]
# sec = "sec"
# min = "min"
# hour = "hour"
# day = "day"
# week = "week"
# mon = "mon"
# year = "year"

# [symbols.git]
# ignore = "!"
# conflict = "X"
# modified = "~"
# renamed = "R"
# added = "+"
# typechange = "T"
# unreadable = "-"
# untracked = "?"
# unchanged = " "
# dir_dirty = "!"
# dir_clean = " "
# repo_dirty = "!"
# repo_clean = "@"
# repo_bare = "+"
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizeTier;
    use crate::core::layout::SortKey;

    #[test]
    fn empty_document_is_default() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(Config::from_toml_str("")?, Config::default());
        Ok(())
    }

    #[test]
    fn partial_document_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let config = Config::from_toml_str(
            r#"
            [general]
            sort = "modified"
            colors = false
            [symbols.size]
            kilo = "k"
            "#,
        )?;
        assert_eq!(config.general().sort(), SortKey::Modified);
        assert!(!config.colors());
        assert!(config.general().dirs_first());
        assert_eq!(config.symbols().size(SizeTier::Kilo), "k");
        assert_eq!(config.symbols().size(SizeTier::Mega), "M");
        Ok(())
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(Config::from_toml_str("[general]\ncolors = \"maybe\"").is_err());
    }

    #[test]
    fn generated_files_parse() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        for minimal in [true, false] {
            let path = dir.path().join(format!("lsext-{}.toml", minimal));
            Config::generate_default(&path, minimal)?;
            let content = fs::read_to_string(&path)?;
            assert_eq!(Config::from_toml_str(&content)?, Config::default());
            assert!(Config::generate_default(&path, minimal).is_err());
        }
        Ok(())
    }
}
