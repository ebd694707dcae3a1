//! Text codecs for columns that flatten structured values into a string.

pub mod errors;
pub mod pages;
pub mod registry;

pub use errors::FormatError;
pub use pages::{CommaPageListCodec, PAGE_DELIMITER};
pub use registry::{CodecRegistry, PageListCodec, TextCodec};
