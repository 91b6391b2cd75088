pub mod ts;
pub mod types;
pub mod value;

pub use types::*;
