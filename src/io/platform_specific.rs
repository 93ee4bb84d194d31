// Platform-specific file access for the overwrite engine

use super::IOMode;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

/// An open target file: positioned reads and writes plus a durable sync.
pub trait TargetFile: Read + Write + Seek + Send {
    /// Flush written data to the storage device
    fn sync_data(&mut self) -> io::Result<()>;
}

impl TargetFile for File {
    fn sync_data(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }
}

/// Filesystem operations the engine consumes.
///
/// The engine talks to storage only through this trait, so tests can
/// substitute an instrumented or faulty implementation.
pub trait PlatformIO: Send + Sync {
    /// Open an existing regular file for exclusive read/write access.
    ///
    /// Must not create the file and must not follow a symlink at `path`.
    fn open_target(&self, path: &Path, mode: IOMode) -> io::Result<Box<dyn TargetFile>>;

    /// Remove the directory entry
    fn unlink(&self, path: &Path) -> io::Result<()>;

    /// Get platform name
    fn platform_name(&self) -> &str;
}

/// Describe why a path is not a regular file, or `None` if it is one
pub fn non_regular_kind(file_type: &fs::FileType) -> Option<&'static str> {
    if file_type.is_file() {
        return None;
    }
    if file_type.is_symlink() {
        return Some("symlink");
    }
    if file_type.is_dir() {
        return Some("directory");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if file_type.is_fifo() {
            return Some("fifo");
        }
        if file_type.is_socket() {
            return Some("socket");
        }
        if file_type.is_block_device() || file_type.is_char_device() {
            return Some("device");
        }
    }

    Some("special file")
}

// ============= LOCAL FILESYSTEM =============

/// Local filesystem access through std, with write-through flags where the
/// platform exposes them.
pub struct LocalIO;

impl LocalIO {
    pub fn new() -> Self {
        Self
    }

    fn options(mode: IOMode) -> OpenOptions {
        let mut opts = OpenOptions::new();
        opts.read(true).write(true).create(false);
        Self::apply_flags(&mut opts, mode);
        opts
    }

    #[cfg(unix)]
    fn apply_flags(opts: &mut OpenOptions, mode: IOMode) {
        use std::os::unix::fs::OpenOptionsExt;

        // O_NOFOLLOW closes the window between the symlink check and open
        let mut flags = libc::O_NOFOLLOW;
        if mode == IOMode::Synchronous {
            flags |= libc::O_SYNC;
        }
        opts.custom_flags(flags);
    }

    #[cfg(windows)]
    fn apply_flags(opts: &mut OpenOptions, mode: IOMode) {
        use std::os::windows::fs::OpenOptionsExt;

        if mode == IOMode::Synchronous {
            opts.custom_flags(winapi::um::winbase::FILE_FLAG_WRITE_THROUGH);
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn apply_flags(_opts: &mut OpenOptions, _mode: IOMode) {}

    /// Advisory exclusive lock, released when the handle closes.
    ///
    /// Fails with `WouldBlock` instead of waiting if another handle holds it.
    #[cfg(unix)]
    fn lock_exclusive(file: &File) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    // No advisory lock outside unix
    #[cfg(not(unix))]
    fn lock_exclusive(_file: &File) -> io::Result<()> {
        Ok(())
    }
}

impl Default for LocalIO {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformIO for LocalIO {
    fn open_target(&self, path: &Path, mode: IOMode) -> io::Result<Box<dyn TargetFile>> {
        // Type check without following links; opening a fifo would block
        let metadata = fs::symlink_metadata(path)?;
        if let Some(kind) = non_regular_kind(&metadata.file_type()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a regular file ({})", kind),
            ));
        }

        let file = Self::options(mode).open(path)?;
        Self::lock_exclusive(&file)?;
        Ok(Box::new(file))
    }

    fn unlink(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn platform_name(&self) -> &str {
        if cfg!(target_os = "linux") {
            "Linux (O_SYNC write-through)"
        } else if cfg!(windows) {
            "Windows (FILE_FLAG_WRITE_THROUGH)"
        } else if cfg!(unix) {
            "Unix (O_SYNC write-through)"
        } else {
            "Generic (sync after each pass)"
        }
    }
}

/// Get platform-specific I/O implementation
pub fn get_platform_io() -> Box<dyn PlatformIO> {
    Box::new(LocalIO::new())
}
