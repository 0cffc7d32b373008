//! 基础设施层：屏幕、指针、OCR 引擎、模板匹配
//!
//! 对外只暴露能力 trait 和各自的默认实现，
//! 上层通过 trait 对象注入，测试时替换为桩实现。

pub mod screen;
pub mod template;
pub mod tesseract;

pub use screen::{EnigoPointer, PointerControl, ScreenCapture, XcapScreen};
pub use template::{find_best_match, TemplateMatch};
pub use tesseract::{OcrProvider, TesseractOcr};
