//! 答题会话编排
//!
//! 组装全部依赖，循环处理屏幕上的题目，直到画面不再变化
//! 或收到紧急停止信号。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{EnigoPointer, TesseractOcr, XcapScreen};
use crate::layout::LayoutService;
use crate::oracle::{AnswerOracle, ClaudeOracle, CohereOracle, ConsensusVoter, OpenAiOracle};
use crate::services::{ActionDispatcher, QaStore};
use crate::utils::init_log_file;
use crate::workflow::{QuizCtx, QuizFlow};

/// 应用主结构
pub struct App {
    config: Config,
    ctx: QuizCtx,
    flow: QuizFlow,
}

/// 会话统计
#[derive(Debug, Default)]
struct SessionStats {
    answered: usize,
    cache_hits: usize,
    failed: usize,
    /// 逐题累积的错误信息，会话结束时一并输出
    errors: Vec<String>,
}

impl SessionStats {
    /// 记录一次失败，返回该错误是否应终止会话
    ///
    /// 分发类错误是终止性的：选项可能已被点击而提交没有落地，
    /// 继续循环只会对着同一画面重复点击
    fn record_failure(&mut self, label: &str, err: &AppError) -> bool {
        self.failed += 1;
        self.errors.push(format!("{}: {}", label, err));
        matches!(err, AppError::Dispatch(_))
    }
}

impl App {
    /// 初始化应用：组装截屏、OCR、版面、投票、分发、缓存
    pub fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let screen = Arc::new(XcapScreen::new());
        let pointer = Arc::new(EnigoPointer::new()?);
        let ocr = Arc::new(TesseractOcr::new());

        let layout = LayoutService::new(&config);

        // oracle 顺序即优先级，三票各异时采信第二位
        let oracles: Vec<Arc<dyn AnswerOracle>> = vec![
            Arc::new(OpenAiOracle::new(&config)),
            Arc::new(ClaudeOracle::new(&config)),
            Arc::new(CohereOracle::new(&config)),
        ];
        let voter = ConsensusVoter::new(
            oracles,
            Duration::from_secs(config.oracle_timeout_secs),
        );

        let dispatcher = ActionDispatcher::new(&config, screen.clone(), pointer);
        let qa_store = QaStore::open(&config.qa_cache_path)?;

        let ctx = QuizCtx::new(config.region());
        install_stop_handler(&ctx);

        let flow = QuizFlow::new(
            &config, screen, ocr, layout, voter, dispatcher, qa_store,
        );

        Ok(Self { config, ctx, flow })
    }

    /// 运行答题主循环
    pub async fn run(&mut self) -> Result<()> {
        let mut stats = SessionStats::default();
        let mut last_text = String::new();
        let mut same_text_count = 0usize;

        loop {
            if self.ctx.is_stopped() {
                info!("🛑 收到停止信号，结束会话");
                break;
            }

            self.ctx.advance();
            info!("\n{}", "-".repeat(50));
            info!("📝 开始处理{}", self.ctx);

            match self.flow.process_one(self.ctx.region).await {
                Ok(outcome) => {
                    stats.answered += 1;
                    if outcome.from_cache {
                        stats.cache_hits += 1;
                    }
                    info!("✓ {}完成，答案为选项 {}", self.ctx, outcome.answer);
                }
                Err(e) => {
                    error!("❌ {}处理失败: {}", self.ctx, e);
                    if stats.record_failure(&self.ctx.to_string(), &e) {
                        error!("🛑 分发失败属于终止性错误，停止会话");
                        break;
                    }
                }
            }

            if self.ctx.is_stopped() {
                info!("🛑 收到停止信号，结束会话");
                break;
            }

            // 等待下一题加载，画面持续不变则认为答完了
            self.wait_between_questions().await;
            match self.flow.read_tagged_text(self.ctx.region).await {
                Ok(text) => {
                    if text == last_text {
                        same_text_count += 1;
                        info!(
                            "⏸️ 画面未变化（连续 {}/{} 次）",
                            same_text_count, self.config.max_same_text_repeats
                        );
                        if same_text_count >= self.config.max_same_text_repeats {
                            info!("🏁 画面连续多次未变化，判定答题结束");
                            break;
                        }
                    } else {
                        same_text_count = 0;
                        last_text = text;
                    }
                }
                Err(e) => {
                    warn!("画面检测失败，继续下一轮: {}", e);
                }
            }
        }

        print_final_stats(&stats);
        Ok(())
    }

    /// 答完一题后的随机等待，模拟人工节奏
    async fn wait_between_questions(&self) {
        let secs = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.config.wait_min_secs..=self.config.wait_max_secs)
        };
        info!("⏳ 等待 {:.1} 秒后检测下一题", secs);
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }
}

/// 把 Ctrl-C 接到紧急停止开关上
fn install_stop_handler(ctx: &QuizCtx) {
    let handle = ctx.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("\n🛑 捕获到 Ctrl-C，将在当前检查点停止");
            handle.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    });
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 屏幕答题模式");
    info!(
        "📐 截取区域: ({}, {}) {}x{}",
        config.region_x, config.region_y, config.region_width, config.region_height
    );
    info!("🗳️ 投票重试上限: {}", config.max_vote_retries);
    info!("{}", "=".repeat(60));
}

fn print_final_stats(stats: &SessionStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 会话统计");
    info!("  ✓ 成功答题: {}", stats.answered);
    info!("  💾 缓存命中: {}", stats.cache_hits);
    info!("  ❌ 失败: {}", stats.failed);
    if !stats.errors.is_empty() {
        info!("  📋 错误清单:");
        for msg in &stats.errors {
            info!("    - {}", msg);
        }
    }
    info!("{}", "=".repeat(60));
}
