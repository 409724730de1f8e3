//! Command-line argument parsing for lsext.
//!
//! Boolean flags toggle the matching `[general]` setting from the config file rather than
//! forcing it on, so `-n` turns colors off when they are configured on and back on otherwise.
//!
//! `--init` and `--init-full` write a default config file and exit without listing.

use crate::config::Config;
use crate::core::layout::SortKey;

use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "lsext",
    version,
    about = "List directory contents with configurable columns, colors and git status"
)]
pub struct Args {
    #[arg(short = 'a', long = "all", help = "Toggle listing of dot entries")]
    pub all: bool,

    #[arg(short = 'L', long, help = "Toggle following of symbolic links")]
    pub dereference: bool,

    #[arg(short = 'M', long, help = "Toggle mountpoint resolution in list mode")]
    pub mounts: bool,

    #[arg(short = 'r', long, help = "Toggle reversal of the sort key")]
    pub reverse: bool,

    #[arg(short = 'f', long = "dirs-first", help = "Toggle listing directories first")]
    pub dirs_first: bool,

    #[arg(short = 'g', long, help = "Toggle grouping by extension")]
    pub group: bool,

    #[arg(short = 'l', long, help = "Toggle the long (list) format")]
    pub long: bool,

    #[arg(short = 'n', long = "no-color", help = "Toggle colored output")]
    pub no_color: bool,

    #[arg(short = 'i', long = "numeric-ids", help = "Toggle numeric user and group ids")]
    pub numeric_ids: bool,

    #[arg(
        short = 't',
        long = "sort-modified",
        overrides_with_all = ["sort_size", "sort_name"],
        help = "Sort by modification time, newest first"
    )]
    pub sort_modified: bool,

    #[arg(
        short = 'S',
        long = "sort-size",
        overrides_with_all = ["sort_modified", "sort_name"],
        help = "Sort by size, largest first"
    )]
    pub sort_size: bool,

    #[arg(
        short = 'A',
        long = "sort-name",
        overrides_with_all = ["sort_modified", "sort_size"],
        help = "Sort by name"
    )]
    pub sort_name: bool,

    #[arg(
        short = 'c',
        long,
        value_name = "N",
        help = "Force the number of grid columns (0: fit the terminal)"
    )]
    pub columns: Option<usize>,

    #[arg(
        short = 'F',
        long,
        value_name = "FMT",
        help = "Use FMT as the list format (implies -l)"
    )]
    pub format: Option<String>,

    #[arg(short = 'N', long = "no-config", help = "Ignore the configuration file")]
    pub no_config: bool,

    #[arg(long, help = "Generate a minimal default configuration and exit")]
    pub init: bool,

    #[arg(
        long = "init-full",
        help = "Generate the full default configuration and exit"
    )]
    pub init_full: bool,

    #[arg(value_name = "PATH", help = "Files or directories to list (default: .)")]
    pub paths: Vec<PathBuf>,
}

impl Args {
    /// The sort key requested on the command line, if any. The last sort flag given wins.
    pub fn sort_key(&self) -> Option<SortKey> {
        if self.sort_modified {
            Some(SortKey::Modified)
        } else if self.sort_size {
            Some(SortKey::Size)
        } else if self.sort_name {
            Some(SortKey::Name)
        } else {
            None
        }
    }
}

pub enum CliAction {
    Exit,
    List(Box<Args>),
}

pub fn handle_args() -> CliAction {
    let args = Args::parse();

    if args.init || args.init_full {
        if let Err(e) = Config::generate_default(&Config::init_path(), !args.init_full) {
            eprintln!("Error: {}", e);
        }
        return CliAction::Exit;
    }

    CliAction::List(Box::new(args))
}
