//! main.rs
//! Entry point for lsext

use lsext::config::Config;
use lsext::core::terminal::terminal_width;
use lsext::core::{GitProvider, Lister, Palette, SystemProvider};
use lsext::utils::cli::{CliAction, handle_args};

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    let args = match handle_args() {
        CliAction::Exit => return ExitCode::SUCCESS,
        CliAction::List(args) => args,
    };

    let mut config = if args.no_config {
        Config::default()
    } else {
        Config::load()
    };
    config.apply_args(&args);

    let palette = Palette::from_env(config.colors());
    let provider = SystemProvider;
    let git = GitProvider;

    let lister = Lister::new(&config, &palette, &provider)
        .with_vcs(&git)
        .with_terminal_width(terminal_width());

    let mut out = BufWriter::new(io::stdout().lock());
    let mut err = io::stderr();

    match lister.run(&args.paths, &mut out, &mut err) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        // `lsext | head` closing the pipe early is not a failure.
        Err(e) if e.is_broken_pipe() => ExitCode::SUCCESS,
        Err(e) => {
            let _ = out.flush();
            eprintln!("lsext: {}", e);
            ExitCode::FAILURE
        }
    }
}
