//! 版面重建核心
//!
//! 两路输入汇聚于此：
//! - AI 结构：LLM 读带编号文本后给出的 {question, answers}，tag 可能缺失
//! - 几何兜底结构：纯行版面推断，永远带锚点
//!
//! `reconcile` 合并两者，必要时再做一轮文本相似度锚点修复

pub mod ai_layout;
pub mod fallback;
pub mod merge;
pub mod reassign;

pub use ai_layout::{parse_ai_structure, LayoutService};
pub use fallback::fallback_structure;
pub use merge::merge_ai_and_fallback;
pub use reassign::{assign_tags_from_ocr, similarity};

use crate::models::{OcrMapping, StructuredQuestion};
use tracing::debug;

/// 把 AI 结构与兜底结构合并为一个带锚点的题目结构
///
/// - `ai` 为 None（调用失败/响应不可解析）时直接采用兜底结构
/// - 合并后仍有选项缺 tag 时触发一轮文本相似度修复
///
/// 纯函数语义：相同输入重复调用产生逐字节相同的输出
pub fn reconcile(
    ai: Option<&StructuredQuestion>,
    fallback: &StructuredQuestion,
    mapping: &OcrMapping,
) -> StructuredQuestion {
    let mut merged = match ai {
        Some(ai) => merge_ai_and_fallback(ai, fallback),
        None => fallback.clone(),
    };

    if merged.has_untagged_answers() {
        debug!("合并后仍有选项缺少锚点，尝试文本相似度修复");
        assign_tags_from_ocr(&mut merged, mapping);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Answer, WordToken};

    fn word(tag: u32, text: &str, line: i32) -> WordToken {
        WordToken {
            tag,
            text: text.to_string(),
            left: 0,
            top: line * 30,
            width: 40,
            height: 20,
            line_num: line,
        }
    }

    fn mapping_of(words: Vec<WordToken>) -> OcrMapping {
        words.into_iter().map(|w| (w.tag, w)).collect()
    }

    #[test]
    fn test_reconcile_without_ai_uses_fallback() {
        let mapping = mapping_of(vec![word(1, "q", 1), word(2, "a", 2), word(3, "b", 3)]);
        let fb = fallback_structure(&mapping, 2);

        let merged = reconcile(None, &fb, &mapping);
        assert_eq!(merged, fb);
    }

    #[test]
    fn test_reconcile_repairs_missing_tags_via_similarity() {
        let mapping = mapping_of(vec![word(1, "question", 1), word(2, "Paris", 2)]);
        let mut ai = StructuredQuestion::new("q");
        // 兜底没有键 2，合并后仍无 tag，靠相似度修复
        ai.answers.insert(2, Answer::new("Paris", None));
        let fb = StructuredQuestion::new("fb");

        let merged = reconcile(Some(&ai), &fb, &mapping);
        assert_eq!(merged.answers[&2].tag, Some(2));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mapping = mapping_of(vec![
            word(1, "question", 1),
            word(2, "Paris", 2),
            word(3, "London", 3),
        ]);
        let fb = fallback_structure(&mapping, 2);
        let mut ai = StructuredQuestion::new("Which city?");
        ai.answers.insert(1, Answer::new("Paris", None));
        ai.answers.insert(2, Answer::new("London", None));

        let once = reconcile(Some(&ai), &fb, &mapping);
        let twice = reconcile(Some(&ai), &fb, &mapping);
        assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }
}
