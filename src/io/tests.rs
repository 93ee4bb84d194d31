use crate::io::*;
use std::io::{Read, Seek, SeekFrom, Write};
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

// ==================== LOCAL IO TESTS ====================

#[test]
fn test_open_target_reports_length_at_end() -> Result<()> {
    let mut temp = NamedTempFile::new()?;
    temp.write_all(&[0xAB; 1234])?;
    temp.flush()?;

    let io = LocalIO::new();
    let mut handle = io.open_target(temp.path(), IOMode::FlushPerPass)?;
    assert_eq!(handle.seek(SeekFrom::End(0))?, 1234);

    Ok(())
}

#[test]
fn test_open_target_overwrites_in_place() -> Result<()> {
    let mut temp = NamedTempFile::new()?;
    temp.write_all(b"hello world")?;
    temp.flush()?;

    let io = LocalIO::new();
    let mut handle = io.open_target(temp.path(), IOMode::Synchronous)?;
    handle.seek(SeekFrom::Start(0))?;
    handle.write_all(b"HELLO")?;
    handle.sync_data()?;
    drop(handle);

    let mut contents = String::new();
    std::fs::File::open(temp.path())?.read_to_string(&mut contents)?;
    assert_eq!(contents, "HELLO world", "write must not append");

    Ok(())
}

#[test]
fn test_open_target_does_not_create() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent");

    let err = LocalIO::new()
        .open_target(&path, IOMode::FlushPerPass)
        .err()
        .expect("open should fail");
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    assert!(!path.exists());
}

#[test]
fn test_open_target_rejects_directory() {
    let dir = TempDir::new().unwrap();

    let err = LocalIO::new()
        .open_target(dir.path(), IOMode::FlushPerPass)
        .err()
        .expect("directories are not targets");
    assert!(err.to_string().contains("directory"), "{}", err);
}

#[cfg(unix)]
#[test]
fn test_open_target_rejects_symlink() -> Result<()> {
    let dir = TempDir::new()?;
    let real = dir.path().join("real");
    std::fs::write(&real, b"keep me")?;
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&real, &link)?;

    let err = LocalIO::new()
        .open_target(&link, IOMode::Synchronous)
        .err()
        .expect("symlinks are not targets");
    assert!(err.to_string().contains("symlink"), "{}", err);
    assert_eq!(std::fs::read(&real)?, b"keep me");

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_open_target_refuses_locked_file() -> Result<()> {
    use std::os::unix::io::AsRawFd;

    let mut temp = NamedTempFile::new()?;
    temp.write_all(b"in use")?;
    let holder = std::fs::File::open(temp.path())?;
    assert_eq!(
        unsafe { libc::flock(holder.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) },
        0
    );

    let err = match LocalIO::new().open_target(temp.path(), IOMode::FlushPerPass) {
        Ok(_) => panic!("opened a file locked by another handle"),
        Err(e) => e,
    };
    assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);

    drop(holder);
    assert!(LocalIO::new().open_target(temp.path(), IOMode::FlushPerPass).is_ok());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_open_target_holds_lock_until_dropped() -> Result<()> {
    let temp = NamedTempFile::new()?;
    let io = LocalIO::new();

    let first = io.open_target(temp.path(), IOMode::FlushPerPass)?;
    assert!(io.open_target(temp.path(), IOMode::FlushPerPass).is_err());
    drop(first);
    assert!(io.open_target(temp.path(), IOMode::FlushPerPass).is_ok());
    Ok(())
}

#[test]
fn test_unlink_removes_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("victim");
    std::fs::write(&path, b"x")?;

    LocalIO::new().unlink(&path)?;
    assert!(!path.exists());

    Ok(())
}

#[test]
fn test_platform_name_not_empty() {
    assert!(!get_platform_io().platform_name().is_empty());
}

// ==================== IO MODE TESTS ====================

#[test]
fn test_io_mode_parse() {
    assert_eq!("synchronous".parse::<IOMode>(), Ok(IOMode::Synchronous));
    assert_eq!("flush".parse::<IOMode>(), Ok(IOMode::FlushPerPass));
    assert!("direct".parse::<IOMode>().is_err());
    assert_eq!(IOMode::default(), IOMode::Synchronous);
}

#[test]
fn test_io_mode_display_round_trips() {
    for mode in [IOMode::Synchronous, IOMode::FlushPerPass] {
        assert_eq!(mode.to_string().parse::<IOMode>(), Ok(mode));
    }
}

// ==================== METRICS TESTS ====================

#[test]
fn test_metrics_accuracy() {
    let metrics = IOMetrics::new();

    for _ in 0..10 {
        metrics.record_write(4096);
    }
    metrics.record_verified(1024);
    metrics.record_file(true);
    metrics.record_file(false);
    metrics.record_pass(Duration::from_millis(5));
    metrics.record_pass(Duration::from_millis(2));

    let stats = metrics.stats();
    assert_eq!(stats.bytes_written, 40960);
    assert_eq!(stats.write_calls, 10);
    assert_eq!(stats.bytes_verified, 1024);
    assert_eq!(stats.files_deleted, 1);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.slowest_pass, Duration::from_millis(5));
    assert!(stats.summary().contains("1 deleted, 1 failed"));
}
