pub mod stage0_group;
pub mod stage1_correct;
pub mod stage2_extract;
pub mod stage3_prune;

pub use stage0_group::*;
pub use stage1_correct::*;
pub use stage2_extract::*;
pub use stage3_prune::*;
