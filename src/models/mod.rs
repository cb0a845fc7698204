pub mod segment;
pub mod term;
pub mod word;

pub use segment::*;
pub use term::*;
pub use word::*;
