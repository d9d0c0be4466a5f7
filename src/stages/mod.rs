pub mod stage0_normalize;
pub mod stage1_segment;
pub mod stage2_index;
pub mod stage3_score;

pub use stage0_normalize::*;
pub use stage1_segment::*;
pub use stage2_index::*;
pub use stage3_score::*;
