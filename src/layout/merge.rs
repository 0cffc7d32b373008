//! AI 结构与几何兜底结构的合并
//!
//! 合并偏好：文本用 AI 的措辞（通常更干净可读），
//! 锚点 tag 用几何来源（对坐标更可靠）。

use crate::models::{Answer, StructuredQuestion};
use std::collections::BTreeMap;

/// 合并 AI 结构和几何兜底结构
///
/// 规则：
/// - 题干优先取 AI 版本，AI 为空时退回兜底版本
/// - 对每个 AI 位置键：若 AI 选项无 tag 且兜底存在同键，
///   采用兜底的 tag（文本仍取 AI 的；AI 文本为空则取兜底文本）；
///   否则保持 AI 选项原样（带 tag 的 AI 选项绝不被覆盖）
/// - 仅存在于兜底的位置键整体并入合并结果（并集合并）
///
/// 合并是纯函数：相同输入永远产生相同输出。
pub fn merge_ai_and_fallback(
    ai: &StructuredQuestion,
    fallback: &StructuredQuestion,
) -> StructuredQuestion {
    let question = if ai.question.trim().is_empty() {
        fallback.question.clone()
    } else {
        ai.question.clone()
    };

    let mut merged_answers: BTreeMap<u32, Answer> = BTreeMap::new();

    for (key, answer) in &ai.answers {
        if answer.tag.is_none() {
            if let Some(fb) = fallback.answers.get(key) {
                let text = if answer.text.trim().is_empty() {
                    fb.text.clone()
                } else {
                    answer.text.clone()
                };
                merged_answers.insert(*key, Answer::new(text, fb.tag));
                continue;
            }
        }
        merged_answers.insert(*key, answer.clone());
    }

    // 并集合并：AI 漏掉的位置键从兜底补齐，避免凭空丢选项
    for (key, fb) in &fallback.answers {
        merged_answers.entry(*key).or_insert_with(|| fb.clone());
    }

    StructuredQuestion {
        question,
        answers: merged_answers,
    }
}
