pub mod extractor;
pub mod preprocess;

pub use extractor::{extract_tagged_words, RawFragment};
pub use preprocess::{preprocess_image, OcrSettings};
