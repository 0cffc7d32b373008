//! 编排层：会话生命周期管理

pub mod session_runner;

pub use session_runner::App;
