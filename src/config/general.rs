//! The general configuration settings for lsext.
//!
//! This module defines the [General] struct, deserialized from the `[general]` table of
//! lsext.toml. It holds the boolean toggles, the sort key, the two format templates and the forced
//! column count. Command-line flags are folded in through [General::apply_args] before anything is
//! rendered; after that the settings are read-only.

use crate::core::layout::SortKey;
use crate::utils::cli::Args;

use serde::Deserialize;

/// Default template for long (`-l`) listings.
pub const DEFAULT_FORMAT: &str = "@p @U @^r@t @^s @G@f";
/// Default template for grid listings.
pub const DEFAULT_GRID_FORMAT: &str = "@G@F";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct General {
    colors: bool,
    list: bool,
    show_hidden: bool,
    resolve_links: bool,
    resolve_mounts: bool,
    resolve_repos: bool,
    numeric_ids: bool,
    reversed: bool,
    dirs_first: bool,
    group_by_type: bool,
    sort: SortKey,
    size_number_color: bool,
    date_number_color: bool,
    override_git_repo_color: bool,
    override_git_entry_color: bool,
    format: String,
    grid_format: String,
    columns: usize,
}

impl Default for General {
    fn default() -> Self {
        General {
            colors: true,
            list: false,
            show_hidden: false,
            resolve_links: false,
            resolve_mounts: true,
            resolve_repos: true,
            numeric_ids: false,
            reversed: false,
            dirs_first: true,
            group_by_type: false,
            sort: SortKey::Name,
            size_number_color: true,
            date_number_color: true,
            override_git_repo_color: false,
            override_git_entry_color: false,
            format: DEFAULT_FORMAT.to_string(),
            grid_format: DEFAULT_GRID_FORMAT.to_string(),
            columns: 0,
        }
    }
}

impl General {
    /// Folds command-line flags into the loaded settings. Boolean flags toggle the configured
    /// value rather than forcing it on.
    pub(crate) fn apply_args(&mut self, args: &Args) {
        let toggle = |value: &mut bool, flag: bool| {
            if flag {
                *value = !*value;
            }
        };

        toggle(&mut self.show_hidden, args.all);
        toggle(&mut self.resolve_links, args.dereference);
        toggle(&mut self.resolve_mounts, args.mounts);
        toggle(&mut self.reversed, args.reverse);
        toggle(&mut self.dirs_first, args.dirs_first);
        toggle(&mut self.group_by_type, args.group);
        toggle(&mut self.list, args.long);
        toggle(&mut self.colors, args.no_color);
        toggle(&mut self.numeric_ids, args.numeric_ids);

        if let Some(sort) = args.sort_key() {
            self.sort = sort;
        }
        if let Some(columns) = args.columns {
            self.columns = columns;
        }
        if let Some(format) = &args.format {
            self.format = format.clone();
            self.list = true;
        }
    }

    #[inline]
    pub fn colors(&self) -> bool {
        self.colors
    }

    #[inline]
    pub fn list(&self) -> bool {
        self.list
    }

    #[inline]
    pub fn show_hidden(&self) -> bool {
        self.show_hidden
    }

    #[inline]
    pub fn resolve_links(&self) -> bool {
        self.resolve_links
    }

    #[inline]
    pub fn resolve_mounts(&self) -> bool {
        self.resolve_mounts
    }

    #[inline]
    pub fn resolve_repos(&self) -> bool {
        self.resolve_repos
    }

    #[inline]
    pub fn numeric_ids(&self) -> bool {
        self.numeric_ids
    }

    #[inline]
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    #[inline]
    pub fn dirs_first(&self) -> bool {
        self.dirs_first
    }

    #[inline]
    pub fn group_by_type(&self) -> bool {
        self.group_by_type
    }

    #[inline]
    pub fn sort(&self) -> SortKey {
        self.sort
    }

    #[inline]
    pub fn size_number_color(&self) -> bool {
        self.size_number_color
    }

    #[inline]
    pub fn date_number_color(&self) -> bool {
        self.date_number_color
    }

    #[inline]
    pub fn override_git_repo_color(&self) -> bool {
        self.override_git_repo_color
    }

    #[inline]
    pub fn override_git_entry_color(&self) -> bool {
        self.override_git_entry_color
    }

    /// The template in effect: the long format in list mode, the grid format otherwise.
    pub fn active_format(&self) -> &str {
        if self.list {
            &self.format
        } else {
            &self.grid_format
        }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_toggle_configured_values() {
        let mut general = General::default();
        let args = Args::parse_from(["lsext", "-a", "-f", "-n", "-S"]);
        general.apply_args(&args);

        assert!(general.show_hidden());
        assert!(!general.dirs_first());
        assert!(!general.colors());
        assert_eq!(general.sort(), SortKey::Size);
    }

    #[test]
    fn format_flag_implies_list() {
        let mut general = General::default();
        let args = Args::parse_from(["lsext", "-F", "@f @s"]);
        general.apply_args(&args);

        assert!(general.list());
        assert_eq!(general.active_format(), "@f @s");
    }

    #[test]
    fn grid_format_outside_list_mode() {
        let general = General::default();
        assert_eq!(general.active_format(), DEFAULT_GRID_FORMAT);
    }
}
