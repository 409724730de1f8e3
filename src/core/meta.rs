//! Filesystem metadata for lsext.
//!
//! [Stat] is the snapshot every entry is rendered from. All OS access (stat, readlink, user and
//! group names, ACLs, the mount table) goes through the [MetadataProvider] trait so the renderer can
//! be driven by fakes in tests. [SystemProvider] is the real implementation, with the mount-table
//! and ACL bits selected per platform.
//!
//! [IdCache] memoizes uid/gid name lookups across all entries and worker threads.

use phf::phf_set;
use uzers::{get_group_by_gid, get_user_by_uid};

use std::collections::HashMap;
use std::fs::{self, Metadata};
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Mode bits, as laid out by `stat(2)`.
pub mod mode {
    pub const S_IFMT: u32 = 0o170000;
    pub const S_IFSOCK: u32 = 0o140000;
    pub const S_IFLNK: u32 = 0o120000;
    pub const S_IFREG: u32 = 0o100000;
    pub const S_IFBLK: u32 = 0o060000;
    pub const S_IFDIR: u32 = 0o040000;
    pub const S_IFCHR: u32 = 0o020000;
    pub const S_IFIFO: u32 = 0o010000;
    pub const S_IFDOOR: u32 = 0o150000;

    pub const S_ISUID: u32 = 0o4000;
    pub const S_ISGID: u32 = 0o2000;
    pub const S_ISVTX: u32 = 0o1000;

    pub const S_IXUSR: u32 = 0o100;
    pub const S_IXGRP: u32 = 0o010;
    pub const S_IWOTH: u32 = 0o002;
    pub const S_IXOTH: u32 = 0o001;
}

/// Filesystems whose mount entries never describe the backing device of a directory.
static PSEUDO_FILESYSTEMS: phf::Set<&'static str> = phf_set! {
    "autofs",
    "rootfs",
};

/// File type decoded from the `S_IFMT` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    Directory,
    Block,
    Char,
    Fifo,
    Symlink,
    Socket,
    Door,
    Unknown,
}

impl FileKind {
    /// Mode words without any type bits are treated as regular files.
    pub fn from_mode(bits: u32) -> FileKind {
        match bits & mode::S_IFMT {
            0 | mode::S_IFREG => FileKind::Regular,
            mode::S_IFDIR => FileKind::Directory,
            mode::S_IFBLK => FileKind::Block,
            mode::S_IFCHR => FileKind::Char,
            mode::S_IFIFO => FileKind::Fifo,
            mode::S_IFLNK => FileKind::Symlink,
            mode::S_IFSOCK => FileKind::Socket,
            mode::S_IFDOOR if cfg!(any(target_os = "solaris", target_os = "illumos")) => {
                FileKind::Door
            }
            _ => FileKind::Unknown,
        }
    }

    /// The classic `ls -l` type letter.
    pub fn letter(self) -> char {
        match self {
            FileKind::Regular => '-',
            FileKind::Directory => 'd',
            FileKind::Block => 'b',
            FileKind::Char => 'c',
            FileKind::Fifo => 'p',
            FileKind::Symlink => 'l',
            FileKind::Socket => 's',
            FileKind::Door => 'D',
            FileKind::Unknown => '?',
        }
    }
}

/// One `stat`/`lstat` result. Everything an entry needs is derived from a single snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stat {
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub mtime: i64,
    pub dev: u64,
    pub ino: u64,
}

impl Stat {
    #[inline]
    pub fn kind(&self) -> FileKind {
        FileKind::from_mode(self.mode)
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind() == FileKind::Directory
    }

    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.kind() == FileKind::Symlink
    }
}

impl From<&Metadata> for Stat {
    fn from(md: &Metadata) -> Self {
        Stat {
            mode: md.mode(),
            uid: md.uid(),
            gid: md.gid(),
            size: md.size(),
            mtime: md.mtime(),
            dev: md.dev(),
            ino: md.ino(),
        }
    }
}

/// Source of every fact the renderer asks the operating system for.
pub trait MetadataProvider: Send + Sync {
    /// Metadata of the path itself, not following a final symlink.
    fn lstat(&self, path: &Path) -> io::Result<Stat>;

    /// Metadata following symlinks.
    fn stat(&self, path: &Path) -> io::Result<Stat>;

    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    fn user_name(&self, uid: u32) -> Option<String>;

    fn group_name(&self, gid: u32) -> Option<String>;

    /// Whether the path carries an extended or POSIX ACL.
    fn has_acl(&self, path: &Path, kind: FileKind) -> bool;

    /// The mount source (device, remote share, ...) of the filesystem with device id `dev`.
    fn mount_source(&self, dev: u64) -> Option<String>;
}

/// Provider backed by the running system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProvider;

impl MetadataProvider for SystemProvider {
    fn lstat(&self, path: &Path) -> io::Result<Stat> {
        fs::symlink_metadata(path).map(|md| Stat::from(&md))
    }

    fn stat(&self, path: &Path) -> io::Result<Stat> {
        fs::metadata(path).map(|md| Stat::from(&md))
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    fn user_name(&self, uid: u32) -> Option<String> {
        get_user_by_uid(uid).map(|u| u.name().to_string_lossy().into_owned())
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        get_group_by_gid(gid).map(|g| g.name().to_string_lossy().into_owned())
    }

    fn has_acl(&self, path: &Path, kind: FileKind) -> bool {
        if kind == FileKind::Symlink {
            return false;
        }
        platform::has_acl(path, kind)
    }

    fn mount_source(&self, dev: u64) -> Option<String> {
        platform::mount_table()
            .into_iter()
            .filter(|m| !PSEUDO_FILESYSTEMS.contains(m.fs_type.as_str()))
            .find(|m| {
                fs::metadata(&m.target)
                    .map(|md| md.dev() == dev)
                    .unwrap_or(false)
            })
            .map(|m| m.source)
    }
}

/// One line of the mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub source: String,
    pub target: PathBuf,
    pub fs_type: String,
}

#[cfg(target_os = "linux")]
mod platform {
    use super::{FileKind, MountEntry};

    use std::fs;
    use std::path::{Path, PathBuf};

    const MOUNTS: &str = "/proc/mounts";
    const ACL_ACCESS: &str = "system.posix_acl_access";
    const ACL_DEFAULT: &str = "system.posix_acl_default";

    pub(super) fn has_acl(path: &Path, kind: FileKind) -> bool {
        let present = |name: &str| {
            matches!(xattr::get(path, name), Ok(Some(value)) if !value.is_empty())
        };
        present(ACL_ACCESS) || (kind == FileKind::Directory && present(ACL_DEFAULT))
    }

    pub(super) fn mount_table() -> Vec<MountEntry> {
        match fs::read_to_string(MOUNTS) {
            Ok(content) => parse_proc_mounts(&content),
            Err(e) => {
                log::debug!("cannot read {}: {}", MOUNTS, e);
                Vec::new()
            }
        }
    }

    pub(super) fn parse_proc_mounts(content: &str) -> Vec<MountEntry> {
        content
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let source = fields.next()?;
                let target = fields.next()?;
                let fs_type = fields.next()?;
                Some(MountEntry {
                    source: unescape_octal(source),
                    target: PathBuf::from(unescape_octal(target)),
                    fs_type: fs_type.to_string(),
                })
            })
            .collect()
    }

    /// `/proc/mounts` encodes spaces, tabs and backslashes as `\ooo`.
    fn unescape_octal(field: &str) -> String {
        let bytes = field.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\\'
                && i + 3 < bytes.len()
                && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b))
            {
                let value = (bytes[i + 1] - b'0') as u32 * 64
                    + (bytes[i + 2] - b'0') as u32 * 8
                    + (bytes[i + 3] - b'0') as u32;
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
            out.push(bytes[i]);
            i += 1;
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn parses_proc_mounts() {
            let table = "/dev/sda1 / ext4 rw,relatime 0 0\n\
                         server:/share /mnt/my\\040share nfs4 rw 0 0\n\
                         broken\n";
            let mounts = parse_proc_mounts(table);
            assert_eq!(mounts.len(), 2);
            assert_eq!(mounts[0].source, "/dev/sda1");
            assert_eq!(mounts[0].fs_type, "ext4");
            assert_eq!(mounts[1].target, PathBuf::from("/mnt/my share"));
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod platform {
    use super::{FileKind, MountEntry};

    use std::path::{Path, PathBuf};
    use std::process::{Command, Stdio};

    const ACL_SECURITY: &str = "com.apple.system.Security";

    pub(super) fn has_acl(path: &Path, _kind: FileKind) -> bool {
        matches!(xattr::get(path, ACL_SECURITY), Ok(Some(_)))
    }

    /// Parses `mount` output of the form `source on target (type, options)`.
    pub(super) fn mount_table() -> Vec<MountEntry> {
        let output = match Command::new("mount").stderr(Stdio::null()).output() {
            Ok(out) if out.status.success() => out,
            Ok(_) | Err(_) => return Vec::new(),
        };

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| {
                let (source, rest) = line.split_once(" on ")?;
                let (target, opts) = rest.rsplit_once(" (")?;
                let fs_type = opts.split([',', ')']).next()?.trim();
                Some(MountEntry {
                    source: source.to_string(),
                    target: PathBuf::from(target),
                    fs_type: fs_type.to_string(),
                })
            })
            .collect()
    }
}

/// Process-wide uid/gid name cache.
///
/// Populated lazily on first sight of an id and never evicted. Each id has its own slot: workers
/// asking for the same id wait for one lookup, lookups of different ids run concurrently.
#[derive(Debug, Default)]
pub struct IdCache {
    users: IdSlots,
    groups: IdSlots,
}

type IdSlots = Mutex<HashMap<u32, Arc<OnceLock<String>>>>;

impl IdCache {
    pub fn new() -> Self {
        IdCache::default()
    }

    /// Owner name for `uid`, or the number itself when `numeric` is set or the id is unknown.
    pub fn user(&self, uid: u32, provider: &dyn MetadataProvider, numeric: bool) -> String {
        Self::resolve(&self.users, uid, || {
            if numeric {
                None
            } else {
                provider.user_name(uid)
            }
        })
    }

    /// Group name for `gid`, with the same fallbacks as [IdCache::user].
    pub fn group(&self, gid: u32, provider: &dyn MetadataProvider, numeric: bool) -> String {
        Self::resolve(&self.groups, gid, || {
            if numeric {
                None
            } else {
                provider.group_name(gid)
            }
        })
    }

    fn resolve(table: &IdSlots, id: u32, lookup: impl FnOnce() -> Option<String>) -> String {
        // The table lock only covers finding the slot, never the lookup itself.
        let slot = {
            let mut slots = table.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(id).or_default())
        };

        slot.get_or_init(|| {
            lookup()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| id.to_string())
        })
        .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, Sender, bounded};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct CountingProvider {
        lookups: AtomicUsize,
    }

    impl MetadataProvider for CountingProvider {
        fn lstat(&self, _: &Path) -> io::Result<Stat> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
        fn stat(&self, _: &Path) -> io::Result<Stat> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
        fn read_link(&self, _: &Path) -> io::Result<PathBuf> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
        fn user_name(&self, uid: u32) -> Option<String> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            (uid == 0).then(|| "root".to_string())
        }
        fn group_name(&self, _: u32) -> Option<String> {
            Some(String::new())
        }
        fn has_acl(&self, _: &Path, _: FileKind) -> bool {
            false
        }
        fn mount_source(&self, _: u64) -> Option<String> {
            None
        }
    }

    #[test]
    fn kind_from_mode() {
        assert_eq!(FileKind::from_mode(0o100644), FileKind::Regular);
        assert_eq!(FileKind::from_mode(0o755), FileKind::Regular);
        assert_eq!(FileKind::from_mode(0o040755), FileKind::Directory);
        assert_eq!(FileKind::from_mode(0o120777), FileKind::Symlink);
        assert_eq!(FileKind::from_mode(0o060660).letter(), 'b');
        assert_eq!(FileKind::from_mode(0o140755).letter(), 's');
    }

    #[test]
    fn id_cache_resolves_once() {
        let provider = CountingProvider {
            lookups: AtomicUsize::new(0),
        };
        let cache = IdCache::new();
        assert_eq!(cache.user(0, &provider, false), "root");
        assert_eq!(cache.user(0, &provider, false), "root");
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(cache.user(1234, &provider, false), "1234");
    }

    #[test]
    fn id_cache_numeric_and_empty_names() {
        let provider = CountingProvider {
            lookups: AtomicUsize::new(0),
        };
        let cache = IdCache::new();
        assert_eq!(cache.user(0, &provider, true), "0");
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 0);
        // An empty group name falls back to the number.
        assert_eq!(cache.group(50, &provider, false), "50");
    }

    #[test]
    fn stat_from_real_metadata() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let stat = SystemProvider.lstat(dir.path())?;
        assert!(stat.is_dir());
        assert!(!stat.is_symlink());
        Ok(())
    }

    /// Name lookups where uid 1 waits until uid 2 has been looked up.
    struct RendezvousProvider {
        tx: Sender<()>,
        rx: Receiver<()>,
        met: AtomicBool,
    }

    impl MetadataProvider for RendezvousProvider {
        fn lstat(&self, _: &Path) -> io::Result<Stat> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
        fn stat(&self, _: &Path) -> io::Result<Stat> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
        fn read_link(&self, _: &Path) -> io::Result<PathBuf> {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
        fn user_name(&self, uid: u32) -> Option<String> {
            if uid == 1 {
                let met = self.rx.recv_timeout(Duration::from_secs(5)).is_ok();
                self.met.store(met, Ordering::SeqCst);
            } else {
                let _ = self.tx.send(());
            }
            Some(format!("user{}", uid))
        }
        fn group_name(&self, _: u32) -> Option<String> {
            None
        }
        fn has_acl(&self, _: &Path, _: FileKind) -> bool {
            false
        }
        fn mount_source(&self, _: u64) -> Option<String> {
            None
        }
    }

    #[test]
    fn id_cache_lookups_of_different_ids_overlap() {
        let (tx, rx) = bounded(1);
        let provider = RendezvousProvider {
            tx,
            rx,
            met: AtomicBool::new(false),
        };
        let cache = IdCache::new();

        thread::scope(|scope| {
            let slow = scope.spawn(|| cache.user(1, &provider, false));
            thread::sleep(Duration::from_millis(50));
            let fast = scope.spawn(|| cache.user(2, &provider, false));
            assert_eq!(fast.join().ok(), Some("user2".to_string()));
            assert_eq!(slow.join().ok(), Some("user1".to_string()));
        });

        assert!(provider.met.load(Ordering::SeqCst));
    }

    #[test]
    fn id_cache_same_id_from_many_threads() {
        let provider = CountingProvider {
            lookups: AtomicUsize::new(0),
        };
        let cache = IdCache::new();

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| assert_eq!(cache.user(0, &provider, false), "root"));
            }
        });

        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
    }
}
