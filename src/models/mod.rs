pub mod question;
pub mod word;

pub use question::{Answer, StructuredQuestion};
pub use word::{OcrMapping, WordToken};
