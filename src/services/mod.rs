//! 服务层：点击分发、问答缓存

pub mod dispatcher;
pub mod qa_store;

pub use dispatcher::{resolve_click_point, ActionDispatcher};
pub use qa_store::QaStore;
