pub mod batch;
pub mod discover;
pub mod generate;
pub mod mask;

mod error;

pub use error::{MaskError, Result};
