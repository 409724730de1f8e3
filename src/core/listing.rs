//! Directory listing: discovery, entry construction and output.
//!
//! For every directory the [Lister] reads the names, gathers VCS status for the whole directory,
//! then builds the entries on the [WorkerPool]. Only once every entry of a batch exists is it
//! sorted, laid out and written, one whole line at a time.
//!
//! Operands that cannot be accessed are reported on the error stream and listing continues with
//! the remaining ones.

use crate::config::Config;
use crate::core::entry::{Entry, RenderContext};
use crate::core::format::FormatSpec;
use crate::core::layout::{Layout, Sorter};
use crate::core::meta::{IdCache, MetadataProvider, Stat};
use crate::core::palette::Palette;
use crate::core::style::RESET;
use crate::core::vcs::{DirectoryVcs, VcsProvider};
use crate::core::worker::WorkerPool;
use crate::error::ListError;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Lists directories and files with one configuration.
pub struct Lister<'a> {
    config: &'a Config,
    palette: &'a Palette,
    provider: &'a dyn MetadataProvider,
    vcs: Option<&'a dyn VcsProvider>,
    ids: IdCache,
    format: FormatSpec,
    pool: WorkerPool,
    terminal_width: usize,
    now: i64,
}

impl<'a> Lister<'a> {
    pub fn new(config: &'a Config, palette: &'a Palette, provider: &'a dyn MetadataProvider) -> Self {
        Lister {
            config,
            palette,
            provider,
            vcs: None,
            ids: IdCache::new(),
            format: FormatSpec::parse(config.general().active_format()),
            pool: WorkerPool::default(),
            terminal_width: 0,
            now: chrono::Utc::now().timestamp(),
        }
    }

    /// Enables VCS decoration, unless repository resolution is turned off in the config.
    pub fn with_vcs(mut self, vcs: &'a dyn VcsProvider) -> Self {
        if self.config.general().resolve_repos() {
            self.vcs = Some(vcs);
        }
        self
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_terminal_width(mut self, width: usize) -> Self {
        self.terminal_width = width;
        self
    }

    /// Fixes the reference time used for relative ages.
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = now;
        self
    }

    fn context(&self) -> RenderContext<'_> {
        RenderContext {
            config: self.config,
            palette: self.palette,
            ids: &self.ids,
            provider: self.provider,
            format: &self.format,
            now: self.now,
        }
    }

    fn directory_vcs(&self, dir: &Path) -> DirectoryVcs<'a> {
        match self.vcs {
            Some(vcs) => DirectoryVcs::gather(vcs, dir),
            None => DirectoryVcs::disabled(),
        }
    }

    /// Reads and renders every entry of `dir`. Dot entries are skipped unless hidden files are
    /// shown. Entries that cannot be stat'd are kept in degraded form.
    pub fn browse_dir(&self, dir: &Path) -> Result<Vec<Entry>, ListError> {
        let show_hidden = self.config.general().show_hidden();
        let mut names: Vec<OsString> = Vec::with_capacity(256);

        for entry in fs::read_dir(dir).map_err(|e| ListError::read_dir(dir, e))? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let name = entry.file_name();
            if !show_hidden && name.as_bytes().first() == Some(&b'.') {
                continue;
            }
            names.push(name);
        }

        // Status for the whole directory is complete before any entry is built.
        let vcs = self.directory_vcs(dir);

        let jobs: Vec<(OsString, PathBuf)> = names
            .into_iter()
            .map(|name| {
                let path = dir.join(&name);
                (name, path)
            })
            .collect();

        log::debug!("building {} entries of {}", jobs.len(), dir.display());
        Ok(self
            .pool
            .map(jobs, |(name, path)| self.build_entry(name, path, &vcs)))
    }

    /// Renders file operands, shown by the path they were given as.
    pub fn build_files(&self, paths: &[PathBuf]) -> Vec<Entry> {
        let mut parents: BTreeMap<PathBuf, DirectoryVcs<'a>> = BTreeMap::new();
        for path in paths {
            let parent = parent_dir(path);
            if !parents.contains_key(&parent) {
                let vcs = self.directory_vcs(&parent);
                parents.insert(parent, vcs);
            }
        }

        let jobs: Vec<(OsString, PathBuf, &DirectoryVcs)> = paths
            .iter()
            .filter_map(|path| {
                let vcs = parents.get(&parent_dir(path))?;
                Some((path.as_os_str().to_os_string(), path.clone(), vcs))
            })
            .collect();

        self.pool
            .map(jobs, |(name, path, vcs)| self.build_entry(name, path, vcs))
    }

    fn build_entry(&self, name: OsString, path: PathBuf, vcs: &DirectoryVcs) -> Entry {
        let (path, stat) = self.stat_entry(path);
        let flags = stat.as_ref().and_then(|stat| {
            let child = path.file_name().unwrap_or(path.as_os_str());
            vcs.flags(child, &path, stat)
        });

        Entry::new(name, path, stat, flags, &self.context())
    }

    /// lstat of `path`, or of its target when links are followed. A dangling followed link has
    /// no stat at all.
    fn stat_entry(&self, path: PathBuf) -> (PathBuf, Option<Stat>) {
        let stat = match self.provider.lstat(&path) {
            Ok(stat) => stat,
            Err(e) => {
                log::warn!("cannot stat {}: {}", path.display(), e);
                return (path, None);
            }
        };

        if !stat.is_symlink() || !self.config.general().resolve_links() {
            return (path, Some(stat));
        }

        let target = match self.provider.read_link(&path) {
            Ok(target) if target.is_absolute() => target,
            Ok(target) => parent_dir(&path).join(target),
            Err(e) => {
                log::warn!("cannot read link {}: {}", path.display(), e);
                return (path, Some(stat));
            }
        };

        match self.provider.lstat(&target) {
            Ok(tstat) => (target, Some(tstat)),
            Err(e) => {
                log::warn!("cannot access '{}': {}", path.display(), e);
                (path, None)
            }
        }
    }

    /// Sorts a batch and lays it out into output lines.
    pub fn render(&self, entries: &mut [Entry]) -> Vec<String> {
        Sorter::from_config(self.config.general()).sort(entries);
        Layout::new(&self.format, self.config.general(), self.terminal_width).lines(entries)
    }

    /// Lists every operand (the current directory when there are none).
    ///
    /// File operands are printed first as one batch, then each directory, with a `path:` header
    /// when more than one batch is printed. Returns false when any operand could not be listed.
    pub fn run<W: Write, E: Write>(
        &self,
        operands: &[PathBuf],
        out: &mut W,
        err: &mut E,
    ) -> Result<bool, ListError> {
        let current = [PathBuf::from(".")];
        let operands = if operands.is_empty() {
            &current[..]
        } else {
            operands
        };

        let mut ok = true;
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        for operand in operands {
            match self.classify(operand) {
                Ok(stat) if stat.is_dir() => dirs.push(operand.clone()),
                Ok(_) => files.push(operand.clone()),
                Err(e) => {
                    writeln!(err, "lsext: {}", e)?;
                    ok = false;
                }
            }
        }
        dirs.sort();

        let headers = dirs.len() > 1 || !files.is_empty();
        let mut first = true;

        if !files.is_empty() {
            let mut entries = self.build_files(&files);
            self.write_batch(&mut entries, out)?;
            first = false;
        }

        for dir in &dirs {
            if headers {
                self.write_header(dir, first, out)?;
            }
            first = false;

            match self.browse_dir(dir) {
                Ok(mut entries) => self.write_batch(&mut entries, out)?,
                Err(e) => {
                    out.flush()?;
                    writeln!(err, "lsext: {}", e)?;
                    ok = false;
                }
            }
        }

        Ok(ok)
    }

    /// Operands are classified without following links, unless links are followed.
    fn classify(&self, operand: &Path) -> Result<Stat, ListError> {
        let stat = self
            .provider
            .lstat(operand)
            .map_err(|e| ListError::inaccessible(operand, e))?;

        if stat.is_symlink() && self.config.general().resolve_links() {
            return Ok(self.provider.stat(operand).unwrap_or(stat));
        }
        Ok(stat)
    }

    fn write_header<W: Write>(&self, dir: &Path, first: bool, out: &mut W) -> Result<(), ListError> {
        if !first {
            writeln!(out)?;
        }

        let shown = dir.to_string_lossy();
        let trimmed = shown.trim_end_matches('/');
        let shown = if trimmed.is_empty() { "/" } else { trimmed };
        let reset = if self.config.colors() { RESET } else { "" };

        writeln!(out, "{}{}:", reset, shown)?;
        Ok(())
    }

    fn write_batch<W: Write>(&self, entries: &mut [Entry], out: &mut W) -> Result<(), ListError> {
        for line in self.render(entries) {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Directory containing `path`; `.` for bare names.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_bare_name_is_current_dir() {
        assert_eq!(parent_dir(Path::new("file")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("a/b")), PathBuf::from("a"));
        assert_eq!(parent_dir(Path::new("/")), PathBuf::from("."));
    }
}
