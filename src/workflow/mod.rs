//! 工作流层：单题流水线与答题上下文

pub mod quiz_ctx;
pub mod quiz_flow;

pub use quiz_ctx::QuizCtx;
pub use quiz_flow::{QuizFlow, QuizOutcome};
