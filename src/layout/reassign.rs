//! 锚点修复：文本相似度重指派
//!
//! 合并后仍缺 tag 的选项，拿选项文本和每个 OCR 片段做模糊匹配，
//! 把最相近片段的 tag 指派过去。匹配不到就保持无 tag ——
//! 该选项只是无法自动点击，不是致命错误。

use crate::models::{OcrMapping, StructuredQuestion};
use tracing::{debug, warn};

/// 相似度下限，低于此值不做指派
const MATCH_CUTOFF: f64 = 0.6;

/// 对所有无 tag 的选项尝试按文本相似度指派锚点
///
/// 每个选项只取单一最佳匹配；相似度未过阈值则保持原样
pub fn assign_tags_from_ocr(question: &mut StructuredQuestion, mapping: &OcrMapping) {
    for (key, answer) in question.answers.iter_mut() {
        if answer.tag.is_some() {
            continue;
        }

        let mut best: Option<(u32, f64)> = None;
        for (tag, word) in mapping {
            let score = similarity(&answer.text, &word.text);
            if score >= MATCH_CUTOFF && best.map_or(true, |(_, s)| score > s) {
                best = Some((*tag, score));
            }
        }

        match best {
            Some((tag, score)) => {
                debug!(
                    "通过文本相似度为选项 {} ('{}') 指派 tag {} (相似度 {:.2})",
                    key, answer.text, tag, score
                );
                answer.tag = Some(tag);
            }
            None => {
                warn!("选项 {} ('{}') 未找到相似的 OCR 片段", key, answer.text);
            }
        }
    }
}

/// 基于最长公共子序列的相似度：2*lcs / (len_a + len_b)
///
/// 按字符计算，对 CJK 文本同样适用
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0.0;
    }
    let lcs = lcs_length(&a_chars, &b_chars);
    2.0 * lcs as f64 / (a_chars.len() + b_chars.len()) as f64
}

/// 最长公共子序列长度（滚动数组 DP）
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
