pub mod stage0_normalize;
pub mod stage1_interpolate;
pub mod stage2_index;

pub use stage0_normalize::*;
pub use stage1_interpolate::*;
pub use stage2_index::*;
