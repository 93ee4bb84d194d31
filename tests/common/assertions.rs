/// Assertion helpers for recorded overwrite passes
use super::recording_storage::FileLog;
use super::test_helpers::{all_bytes, entropy};
use anyhow::Result;
use sayonara_shred::Pass;

/// Assert that the recorded passes match `expected`, each `length` bytes long
pub fn assert_passes(log: &FileLog, expected: &[Pass], length: usize) -> Result<()> {
    anyhow::ensure!(
        log.passes.len() == expected.len(),
        "Expected {} passes, recorded {}",
        expected.len(),
        log.passes.len()
    );

    for (i, (written, pass)) in log.passes.iter().zip(expected).enumerate() {
        anyhow::ensure!(
            written.len() == length,
            "Pass {} wrote {} bytes, file length is {}",
            i + 1,
            written.len(),
            length
        );

        match pass {
            Pass::Constant(byte) => anyhow::ensure!(
                all_bytes(written, *byte),
                "Pass {} is not all 0x{:02X}",
                i + 1,
                byte
            ),
            // Only meaningful with enough bytes to sample
            Pass::Random if length >= 4096 => anyhow::ensure!(
                entropy(written) > 7.5,
                "Pass {} does not look random (entropy {:.2})",
                i + 1,
                entropy(written)
            ),
            Pass::Random => {}
        }
    }

    Ok(())
}

/// Assert that the file was written and removed
pub fn assert_shredded(log: &FileLog) -> Result<()> {
    anyhow::ensure!(!log.passes.is_empty(), "No passes recorded");
    anyhow::ensure!(
        log.syncs >= log.passes.len(),
        "Only {} syncs for {} passes",
        log.syncs,
        log.passes.len()
    );
    anyhow::ensure!(log.unlinked, "File was not unlinked");
    Ok(())
}
