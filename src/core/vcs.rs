//! Version-control status for listed entries.
//!
//! A [VcsProvider] answers two questions: what is the status of every path in the repository that
//! contains a directory ([VcsProvider::scan]), and is a given directory itself the root of a
//! repository ([VcsProvider::probe_repo]). [GitProvider] answers them through libgit2.
//!
//! Status is gathered once per listed directory into a [DirectoryVcs] before any entry of that
//! directory is built, and is only read afterwards. Every failure here is soft: a provider that
//! cannot answer yields no flags and the entry renders without VCS decoration.

use crate::core::meta::Stat;

use bitflags::bitflags;
use git2::{Repository, Status, StatusOptions};

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::fs;
use std::ops::Bound;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

bitflags! {
    /// Status bits of one path. Several can be set at once; [VcsState::from_flags] picks the one
    /// that is displayed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct VcsFlags: u32 {
        const IGNORED = 1 << 0;
        const CONFLICTED = 1 << 1;
        const MODIFIED = 1 << 2;
        const RENAMED = 1 << 3;
        const ADDED = 1 << 4;
        const TYPECHANGE = 1 << 5;
        const UNREADABLE = 1 << 6;
        const TRACKED = 1 << 7;
        const UNTRACKED = 1 << 8;
        /// Something below this directory differs from the index or HEAD.
        const DIRTY = 1 << 9;
        const BARE = 1 << 10;
        const IS_REPO = 1 << 11;
    }
}

/// Flags that never make a parent directory dirty.
const CLEAN_MARKERS: VcsFlags = VcsFlags::IGNORED.union(VcsFlags::UNTRACKED);

/// The single state shown for an entry, each with its own symbol and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsState {
    Ignored,
    Conflicted,
    Modified,
    Renamed,
    Added,
    TypeChange,
    Unreadable,
    Untracked,
    Unchanged,
    DirDirty,
    DirClean,
    RepoDirty,
    RepoClean,
    RepoBare,
}

impl VcsState {
    /// Collapses a flag word into the displayed state.
    ///
    /// Repository roots: dirty, then bare, then clean. Other directories: dirty, ignored, tracked,
    /// untracked. Files: ignored, conflicted, modified, renamed, added, type change, unreadable,
    /// tracked, untracked.
    pub fn from_flags(flags: VcsFlags, is_dir: bool) -> VcsState {
        if flags.contains(VcsFlags::IS_REPO) {
            return if flags.contains(VcsFlags::DIRTY) {
                VcsState::RepoDirty
            } else if flags.contains(VcsFlags::BARE) {
                VcsState::RepoBare
            } else {
                VcsState::RepoClean
            };
        }

        if is_dir {
            return if flags.contains(VcsFlags::DIRTY) {
                VcsState::DirDirty
            } else if flags.contains(VcsFlags::IGNORED) {
                VcsState::Ignored
            } else if flags.contains(VcsFlags::TRACKED) {
                VcsState::DirClean
            } else {
                VcsState::Untracked
            };
        }

        const ORDER: [(VcsFlags, VcsState); 8] = [
            (VcsFlags::IGNORED, VcsState::Ignored),
            (VcsFlags::CONFLICTED, VcsState::Conflicted),
            (VcsFlags::MODIFIED, VcsState::Modified),
            (VcsFlags::RENAMED, VcsState::Renamed),
            (VcsFlags::ADDED, VcsState::Added),
            (VcsFlags::TYPECHANGE, VcsState::TypeChange),
            (VcsFlags::UNREADABLE, VcsState::Unreadable),
            (VcsFlags::TRACKED, VcsState::Unchanged),
        ];

        ORDER
            .iter()
            .find(|(flag, _)| flags.contains(*flag))
            .map_or(VcsState::Untracked, |(_, state)| *state)
    }

    #[inline]
    pub fn is_repo(self) -> bool {
        matches!(
            self,
            VcsState::RepoDirty | VcsState::RepoClean | VcsState::RepoBare
        )
    }
}

/// Source of repository status.
pub trait VcsProvider: Send + Sync {
    /// Status of the repository containing `dir`, or None when `dir` is not inside one.
    fn scan(&self, dir: &Path) -> Option<RepoStatus>;

    /// Flags for `dir` when it is the root of a repository (always including `IS_REPO`).
    fn probe_repo(&self, dir: &Path) -> Option<VcsFlags>;
}

/// Snapshot of one repository: per-path status flags and the set of tracked files, all relative
/// to the repository root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoStatus {
    root: PathBuf,
    statuses: BTreeMap<PathBuf, VcsFlags>,
    tracked: BTreeSet<PathBuf>,
}

impl RepoStatus {
    pub fn new(root: PathBuf) -> Self {
        RepoStatus {
            root,
            ..RepoStatus::default()
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn insert_status(&mut self, path: impl Into<PathBuf>, flags: VcsFlags) {
        *self.statuses.entry(path.into()).or_default() |= flags;
    }

    pub fn insert_tracked(&mut self, path: impl Into<PathBuf>) {
        self.tracked.insert(path.into());
    }

    /// Flags of `rel`, a path relative to the root.
    ///
    /// Ignored and untracked states are inherited from the closest ancestor that carries them,
    /// since git reports a whole untracked or ignored directory as one record. Directories are
    /// dirty when any descendant has a real change and tracked when any descendant is tracked.
    pub fn flags_for(&self, rel: &Path, is_dir: bool) -> VcsFlags {
        let mut flags = self.statuses.get(rel).copied().unwrap_or_default();

        if let Some(inherited) = rel
            .ancestors()
            .skip(1)
            .filter_map(|ancestor| self.statuses.get(ancestor))
            .map(|flags| *flags & CLEAN_MARKERS)
            .find(|flags| !flags.is_empty())
        {
            flags |= inherited;
        }

        if self.tracked.contains(rel) {
            flags |= VcsFlags::TRACKED;
        }

        if is_dir {
            let dirty = self
                .statuses
                .range::<Path, _>((Bound::Excluded(rel), Bound::Unbounded))
                .take_while(|(path, _)| path.starts_with(rel))
                .any(|(_, flags)| !flags.difference(CLEAN_MARKERS).is_empty());
            if dirty {
                flags |= VcsFlags::DIRTY;
            }

            let tracked = self
                .tracked
                .range::<Path, _>((Bound::Included(rel), Bound::Unbounded))
                .next()
                .is_some_and(|path| path.starts_with(rel));
            if tracked {
                flags |= VcsFlags::TRACKED;
            }
        }

        flags
    }
}

/// VCS state of one listed directory, gathered before its entries are built.
#[derive(Default)]
pub struct DirectoryVcs<'a> {
    provider: Option<&'a dyn VcsProvider>,
    status: Option<RepoStatus>,
    prefix: PathBuf,
}

impl<'a> DirectoryVcs<'a> {
    /// No VCS decoration at all.
    pub fn disabled() -> Self {
        DirectoryVcs::default()
    }

    /// Scans the repository around `dir`. Never fails; a directory outside any repository still
    /// checks its subdirectories for nested repository roots.
    pub fn gather(provider: &'a dyn VcsProvider, dir: &Path) -> Self {
        let absolute = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let status = provider.scan(&absolute);

        let prefix = status
            .as_ref()
            .and_then(|status| absolute.strip_prefix(status.root()).ok())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        DirectoryVcs {
            provider: Some(provider),
            status,
            prefix,
        }
    }

    /// Flags for the child `name` located at `path`. None means VCS does not apply to it.
    pub fn flags(&self, name: &OsStr, path: &Path, stat: &Stat) -> Option<VcsFlags> {
        let provider = self.provider?;

        if stat.is_dir()
            && let Some(flags) = provider.probe_repo(path)
        {
            return Some(flags);
        }

        let status = self.status.as_ref()?;
        Some(status.flags_for(&self.prefix.join(name), stat.is_dir()))
    }
}

/// Provider backed by libgit2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitProvider;

impl VcsProvider for GitProvider {
    fn scan(&self, dir: &Path) -> Option<RepoStatus> {
        let repo = match Repository::discover(dir) {
            Ok(repo) => repo,
            Err(e) => {
                log::debug!("{} is not in a repository: {}", dir.display(), e.message());
                return None;
            }
        };
        let workdir = repo.workdir()?;
        let root = fs::canonicalize(workdir).unwrap_or_else(|_| workdir.to_path_buf());

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .include_ignored(true)
            .include_unmodified(true)
            .recurse_untracked_dirs(false)
            .exclude_submodules(true);

        let statuses = match repo.statuses(Some(&mut opts)) {
            Ok(statuses) => statuses,
            Err(e) => {
                log::warn!("cannot read status of {}: {}", root.display(), e.message());
                return None;
            }
        };

        let mut status = RepoStatus::new(root);
        for entry in statuses.iter() {
            let path = repo_path(entry.path_bytes());
            let bits = entry.status();

            if !bits.intersects(Status::WT_NEW | Status::IGNORED) {
                status.insert_tracked(path.clone());
            }
            let flags = status_flags(bits);
            if !flags.is_empty() {
                status.insert_status(path, flags);
            }
        }

        log::debug!("scanned repository {}", status.root().display());
        Some(status)
    }

    fn probe_repo(&self, dir: &Path) -> Option<VcsFlags> {
        let repo = Repository::open(dir).ok()?;
        if repo.is_bare() {
            return Some(VcsFlags::IS_REPO | VcsFlags::BARE);
        }

        // A `.git` directory opens as the repository it belongs to; only the work tree counts.
        let workdir = fs::canonicalize(repo.workdir()?).ok()?;
        if fs::canonicalize(dir).ok()? != workdir {
            return None;
        }

        let mut opts = StatusOptions::new();
        opts.include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);

        match repo.statuses(Some(&mut opts)) {
            Ok(statuses) if statuses.is_empty() => Some(VcsFlags::IS_REPO),
            Ok(_) => Some(VcsFlags::IS_REPO | VcsFlags::DIRTY),
            Err(e) => {
                log::debug!("cannot read status of {}: {}", dir.display(), e.message());
                Some(VcsFlags::IS_REPO)
            }
        }
    }
}

/// Repository-relative path of a status entry. Untracked and ignored directories are reported
/// with a trailing slash.
fn repo_path(bytes: &[u8]) -> PathBuf {
    let mut end = bytes.len();
    while end > 1 && bytes[end - 1] == b'/' {
        end -= 1;
    }
    PathBuf::from(OsStr::from_bytes(&bytes[..end]))
}

/// Index and work-tree status bits folded into [VcsFlags].
pub fn status_flags(status: Status) -> VcsFlags {
    const MAPPING: [(Status, VcsFlags); 8] = [
        (Status::IGNORED, VcsFlags::IGNORED),
        (Status::WT_NEW, VcsFlags::UNTRACKED),
        (Status::CONFLICTED, VcsFlags::CONFLICTED),
        (
            Status::INDEX_MODIFIED
                .union(Status::WT_MODIFIED)
                .union(Status::INDEX_DELETED)
                .union(Status::WT_DELETED),
            VcsFlags::MODIFIED,
        ),
        (
            Status::INDEX_RENAMED.union(Status::WT_RENAMED),
            VcsFlags::RENAMED,
        ),
        (Status::INDEX_NEW, VcsFlags::ADDED),
        (
            Status::INDEX_TYPECHANGE.union(Status::WT_TYPECHANGE),
            VcsFlags::TYPECHANGE,
        ),
        (Status::WT_UNREADABLE, VcsFlags::UNREADABLE),
    ];

    MAPPING
        .iter()
        .filter(|(bits, _)| status.intersects(*bits))
        .fold(VcsFlags::empty(), |flags, (_, flag)| flags | *flag)
}
