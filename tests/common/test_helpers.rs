/// Common test helper functions
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `len` bytes of a recognisable non-zero pattern
pub fn create_file(dir: &Path, name: &str, len: usize) -> PathBuf {
    let path = dir.join(name);
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8 | 0x01).collect();
    fs::write(&path, data).expect("Failed to create test file");
    path
}

/// root/{one,two,three} plus root/nested/{four,five}
pub fn create_tree(sizes: [usize; 5]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).expect("Failed to create subdirectory");

    let files = vec![
        create_file(dir.path(), "one", sizes[0]),
        create_file(dir.path(), "two", sizes[1]),
        create_file(dir.path(), "three", sizes[2]),
        create_file(&nested, "four", sizes[3]),
        create_file(&nested, "five", sizes[4]),
    ];
    (dir, files)
}

/// Verify that a buffer contains only `byte`
pub fn all_bytes(buf: &[u8], byte: u8) -> bool {
    buf.iter().all(|&b| b == byte)
}

/// Calculate Shannon entropy of a buffer in bits per byte
pub fn entropy(buf: &[u8]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }

    let mut counts = [0u64; 256];
    for &byte in buf {
        counts[byte as usize] += 1;
    }

    let length = buf.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / length;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_bounds() {
        assert_eq!(entropy(&[0u8; 64]), 0.0);
        let all: Vec<u8> = (0..=255u8).collect();
        assert!((entropy(&all) - 8.0).abs() < 1e-9);
    }
}
