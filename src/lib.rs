//! # Quiz Auto Answer
//!
//! 一个基于屏幕 OCR 的自动答题 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `XcapScreen` - 屏幕截取能力
//! - `EnigoPointer` - 指针点击能力（Enigo 包在 Mutex 里）
//! - `TesseractOcr` - OCR 识别能力（tesseract 子进程）
//! - `template` - 提交按钮的多尺度模板匹配
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个题目
//! - `ActionDispatcher` - 把投票结果落到屏幕点击
//! - `QaStore` - 问答缓存（SQLite）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `QuizCtx` - 上下文封装（区域 + 题号 + 停止开关）
//! - `QuizFlow` - 流程编排（截屏 → OCR → 版面 → 投票 → 点击）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session_runner` - 会话主循环，管理等待节奏和结束判定
//!
//! 另有横切模块：`ocr/`（预处理 + 单词提取）、`layout/`（AI 版面 +
//! 几何兜底 + 合并修复）、`oracle/`（三方答案 oracle + 多数投票）。
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod layout;
pub mod logger;
pub mod models;
pub mod ocr;
pub mod oracle;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Answer, OcrMapping, StructuredQuestion, WordToken};
pub use orchestrator::App;
pub use workflow::{QuizCtx, QuizFlow, QuizOutcome};
