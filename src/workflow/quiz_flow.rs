//! 单题流水线
//!
//! 截屏 → 预处理 → OCR → 编号提取 → AI 版面切分 + 几何兜底 →
//! 合并修复 → 缓存/投票 → 点击分发 → 缓存回写。
//!
//! 锚点修复失败时换一组 OCR 预处理参数整条重跑，
//! 而不是在旧识别结果上打补丁：结构和映射必须出自同一帧。

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, OcrError};
use crate::infrastructure::{OcrProvider, ScreenCapture};
use crate::layout::{self, fallback_structure, LayoutService};
use crate::models::{OcrMapping, StructuredQuestion};
use crate::ocr::{extract_tagged_words, preprocess_image, OcrSettings};
use crate::oracle::ConsensusVoter;
use crate::services::{ActionDispatcher, QaStore};
use crate::utils::truncate_text;

/// 一道题的处理结果
#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub question: String,
    pub answer: u32,
    /// 答案来自缓存还是本轮投票
    pub from_cache: bool,
}

pub struct QuizFlow {
    screen: Arc<dyn ScreenCapture>,
    ocr: Arc<dyn OcrProvider>,
    layout: LayoutService,
    voter: ConsensusVoter,
    dispatcher: ActionDispatcher,
    qa_store: Mutex<QaStore>,
    default_expected_answers: usize,
    max_vote_retries: usize,
    ocr_settings: Vec<OcrSettings>,
}

impl QuizFlow {
    pub fn new(
        config: &Config,
        screen: Arc<dyn ScreenCapture>,
        ocr: Arc<dyn OcrProvider>,
        layout: LayoutService,
        voter: ConsensusVoter,
        dispatcher: ActionDispatcher,
        qa_store: QaStore,
    ) -> Self {
        Self {
            screen,
            ocr,
            layout,
            voter,
            dispatcher,
            qa_store: Mutex::new(qa_store),
            default_expected_answers: config.default_expected_answers,
            max_vote_retries: config.max_vote_retries,
            ocr_settings: config.ocr_settings(),
        }
    }

    /// 截取区域并做一轮默认参数的识别，返回编号文本
    ///
    /// 供外层做"画面是否变化"判断，不走完整流水线
    pub async fn read_tagged_text(&self, region: (i32, i32, u32, u32)) -> AppResult<String> {
        let frame = self.screen.capture_region(region)?;
        let gray = preprocess_image(&frame, OcrSettings::default());
        let fragments = self.ocr.recognize(&gray).await?;
        let (tagged, _) = extract_tagged_words(&fragments);
        Ok(tagged)
    }

    /// 处理当前屏幕上的一道题
    pub async fn process_one(&self, region: (i32, i32, u32, u32)) -> AppResult<QuizOutcome> {
        let (question, mapping) = self.build_structure(region).await?;
        info!("📋 题干: {}", truncate_text(&question.question, 80));

        let (answer, from_cache) = self.decide_answer(&question).await?;
        info!("🎯 选定答案: 选项 {} (缓存: {})", answer, from_cache);

        self.dispatcher.dispatch(&question, answer, &mapping, region)?;

        {
            let store = self
                .qa_store
                .lock()
                .map_err(|_| AppError::Other("问答缓存锁中毒".to_string()))?;
            store.upsert(&question.question, answer)?;
        }

        Ok(QuizOutcome {
            question: question.question,
            answer,
            from_cache,
        })
    }

    /// 构建带锚点的题目结构
    ///
    /// 依次尝试每组预处理参数，直到所有选项都有锚点。
    /// 返回的结构与映射出自同一次识别。
    async fn build_structure(
        &self,
        region: (i32, i32, u32, u32),
    ) -> AppResult<(StructuredQuestion, OcrMapping)> {
        let mut last: Option<(StructuredQuestion, OcrMapping)> = None;

        for (attempt, settings) in self.ocr_settings.iter().enumerate() {
            if attempt > 0 {
                info!(
                    "🔁 锚点不全，换第 {} 组预处理参数重新识别",
                    attempt + 1
                );
            }

            let frame = self.screen.capture_region(region)?;
            let gray = preprocess_image(&frame, *settings);
            let fragments = self.ocr.recognize(&gray).await?;
            let (tagged, mapping) = extract_tagged_words(&fragments);

            if mapping.is_empty() {
                warn!("本组参数未识别出任何单词");
                continue;
            }
            debug!("编号文本: {}", truncate_text(&tagged, 200));

            let ai = self.layout.structure_layout(&tagged).await;
            let expected = ai
                .as_ref()
                .map(|s| s.answers.len())
                .filter(|n| *n > 0)
                .unwrap_or(self.default_expected_answers);

            let fallback = fallback_structure(&mapping, expected);
            let merged = layout::reconcile(ai.as_ref(), &fallback, &mapping);

            if merged.answers.is_empty() {
                let total_lines = count_lines(&mapping);
                warn!("版面无法分离出选项（{} 行文本）", total_lines);
                last = Some((merged, mapping));
                continue;
            }

            if !merged.has_untagged_answers() {
                return Ok((merged, mapping));
            }

            warn!("选项 {:?} 锚点未解析", merged.untagged_keys());
            last = Some((merged, mapping));
        }

        match last {
            Some((merged, mapping)) if merged.answers.is_empty() => Err(
                AppError::ambiguous_layout(count_lines(&mapping), self.default_expected_answers),
            ),
            Some((merged, _)) => Err(AppError::unresolved_anchor(merged.untagged_keys())),
            None => Err(AppError::Ocr(OcrError::EmptyCapture)),
        }
    }

    /// 先查缓存，未命中则投票（带有限次重试）
    async fn decide_answer(&self, question: &StructuredQuestion) -> AppResult<(u32, bool)> {
        {
            let store = self
                .qa_store
                .lock()
                .map_err(|_| AppError::Other("问答缓存锁中毒".to_string()))?;
            if let Some((cached, count)) = store.lookup(&question.question)? {
                if question.answers.contains_key(&cached) {
                    info!("💾 命中缓存答案 {}（历史出现 {} 次）", cached, count);
                    return Ok((cached, true));
                }
                warn!("缓存答案 {} 不在本轮选项集中，忽略缓存", cached);
            }
        }

        for round in 1..=self.max_vote_retries {
            if round > 1 {
                info!("🔁 第 {} 轮投票", round);
            }
            if let Some(winner) = self.voter.vote(question).await {
                if question.answers.contains_key(&winner) {
                    return Ok((winner, false));
                }
                warn!("胜出答案 {} 超出选项范围 1..={}", winner, question.answers.len());
            }
        }

        // 绝不臆造答案：投票失败就让本题失败，留在屏幕上
        Err(AppError::no_determinable_answer())
    }
}

/// 映射覆盖的视觉行数
fn count_lines(mapping: &OcrMapping) -> usize {
    let mut lines: Vec<i32> = mapping.values().map(|w| w.line_num).collect();
    lines.sort_unstable();
    lines.dedup();
    lines.len()
}
