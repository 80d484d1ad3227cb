pub mod extract;

pub use extract::{classify, Extractor};
