//! 点击分发服务
//!
//! 把投票结果落到屏幕上：先解析选项的绝对点击点并单击，
//! 再重截区域定位提交/下一题按钮并单击。
//! 坐标解析是纯函数，所有失败路径都有具名错误。

use std::sync::Arc;

use image::DynamicImage;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, DispatchError};
use crate::infrastructure::{find_best_match, PointerControl, ScreenCapture};
use crate::models::{OcrMapping, StructuredQuestion};

pub struct ActionDispatcher {
    screen: Arc<dyn ScreenCapture>,
    pointer: Arc<dyn PointerControl>,
    template_path: String,
    match_threshold: f32,
}

/// 把投票结果解析为绝对屏幕点击点
///
/// 解析链：位置键 → 选项 → 锚点 tag → WordToken 外接框中心，
/// 最后叠加截取区域原点。链上任何一环断裂都返回具名错误。
pub fn resolve_click_point(
    question: &StructuredQuestion,
    index: u32,
    mapping: &OcrMapping,
    region_origin: (i32, i32),
) -> AppResult<(i32, i32)> {
    let answer = question
        .answers
        .get(&index)
        .ok_or(AppError::Dispatch(DispatchError::AnswerIndexNotFound {
            index,
        }))?;

    let tag = answer
        .tag
        .ok_or(AppError::Dispatch(DispatchError::MissingTag { index }))?;

    let word = mapping
        .get(&tag)
        .ok_or(AppError::Dispatch(DispatchError::TagNotInMapping { tag }))?;

    let (cx, cy) = word.center();
    Ok((region_origin.0 + cx, region_origin.1 + cy))
}

impl ActionDispatcher {
    pub fn new(
        config: &Config,
        screen: Arc<dyn ScreenCapture>,
        pointer: Arc<dyn PointerControl>,
    ) -> Self {
        Self {
            screen,
            pointer,
            template_path: config.submit_template_path.clone(),
            match_threshold: config.template_match_threshold,
        }
    }

    fn load_template(&self) -> AppResult<DynamicImage> {
        image::open(&self.template_path).map_err(|e| {
            AppError::Dispatch(DispatchError::TemplateLoadFailed {
                path: self.template_path.clone(),
                source: Box::new(e),
            })
        })
    }

    /// 点击选中的选项，再定位并点击提交/下一题按钮
    ///
    /// 两次点击之间重新截取区域：选项点击后页面状态可能变化，
    /// 旧帧里的按钮位置不可信。
    pub fn dispatch(
        &self,
        question: &StructuredQuestion,
        index: u32,
        mapping: &OcrMapping,
        region: (i32, i32, u32, u32),
    ) -> AppResult<()> {
        let (x, y) = resolve_click_point(question, index, mapping, (region.0, region.1))?;
        info!("👆 点击选项 {} @ ({}, {})", index, x, y);
        self.pointer.click(x, y)?;

        self.click_submit(region)
    }

    /// 在区域内模板匹配提交按钮并点击
    pub fn click_submit(&self, region: (i32, i32, u32, u32)) -> AppResult<()> {
        let template = self.load_template()?;
        let frame = self.screen.capture_region(region)?;

        let best = find_best_match(&frame, &template);
        match best {
            Some(m) if m.score >= self.match_threshold => {
                let x = region.0 + m.center_x;
                let y = region.1 + m.center_y;
                info!("👆 点击提交按钮 @ ({}, {})，相似度 {:.3}", x, y, m.score);
                self.pointer.click(x, y)
            }
            Some(m) => {
                warn!(
                    "🔎 提交按钮相似度 {:.3} 低于阈值 {:.3}",
                    m.score, self.match_threshold
                );
                Err(AppError::Dispatch(DispatchError::SubmitButtonNotFound {
                    best_score: m.score,
                    threshold: self.match_threshold,
                }))
            }
            None => Err(AppError::Dispatch(DispatchError::SubmitButtonNotFound {
                best_score: f32::NEG_INFINITY,
                threshold: self.match_threshold,
            })),
        }
    }
}
