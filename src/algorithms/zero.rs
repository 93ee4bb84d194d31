// Zero Fill - Single pass writing zeros
//
// Fastest method. Defeats casual undelete tools but gives no protection
// against analysis of the physical medium.

use super::{Pass, PassPlan};

pub struct ZeroFill;

impl ZeroFill {
    /// The only pattern this method writes
    pub const PATTERN: u8 = 0x00;

    pub const PASS_COUNT: usize = 1;

    pub fn plan() -> PassPlan {
        PassPlan::new(vec![Pass::Constant(Self::PATTERN)], false)
    }
}
