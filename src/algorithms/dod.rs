use super::{Pass, PassPlan};

/// DoD 5220.22-M style three-pass overwrite.
pub struct DoDWipe;

impl DoDWipe {
    /// DoD 5220.22-M standard pass 1 pattern (all zeros)
    pub const PASS_1_PATTERN: u8 = 0x00;

    /// DoD 5220.22-M standard pass 2 pattern (all ones)
    pub const PASS_2_PATTERN: u8 = 0xFF;

    /// DoD 5220.22-M requires exactly 3 passes
    pub const PASS_COUNT: usize = 3;

    /// Zeros, ones, then random data; the random pass is read back and
    /// compared before the file is unlinked.
    pub fn plan() -> PassPlan {
        PassPlan::new(
            vec![
                Pass::Constant(Self::PASS_1_PATTERN),
                Pass::Constant(Self::PASS_2_PATTERN),
                Pass::Random,
            ],
            true,
        )
    }
}
