//! 答题上下文
//!
//! 一次会话内跨题共享的轻量状态：截取区域、题目计数、
//! 紧急停止开关。开关由信号处理器置位，各检查点轮询。

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct QuizCtx {
    /// 截取区域 (x, y, width, height)，绝对屏幕坐标
    pub region: (i32, i32, u32, u32),
    /// 当前题目序号（从 1 开始）
    pub question_index: u64,
    emergency_stop: Arc<AtomicBool>,
}

impl QuizCtx {
    pub fn new(region: (i32, i32, u32, u32)) -> Self {
        Self {
            region,
            question_index: 0,
            emergency_stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 紧急停止开关的共享句柄，交给信号处理器
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.emergency_stop)
    }

    pub fn is_stopped(&self) -> bool {
        self.emergency_stop.load(Ordering::SeqCst)
    }

    pub fn request_stop(&self) {
        self.emergency_stop.store(true, Ordering::SeqCst);
    }

    /// 进入下一题
    pub fn advance(&mut self) {
        self.question_index += 1;
    }
}

impl fmt::Display for QuizCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "第 {} 题", self.question_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_handle_is_shared() {
        let ctx = QuizCtx::new((0, 0, 100, 100));
        let handle = ctx.stop_handle();
        assert!(!ctx.is_stopped());

        handle.store(true, Ordering::SeqCst);
        assert!(ctx.is_stopped());
    }

    #[test]
    fn test_advance_counts_questions() {
        let mut ctx = QuizCtx::new((0, 0, 100, 100));
        ctx.advance();
        ctx.advance();
        assert_eq!(ctx.question_index, 2);
        assert_eq!(ctx.to_string(), "第 2 题");
    }
}
