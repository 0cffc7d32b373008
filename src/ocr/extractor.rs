//! 单词提取器
//!
//! 把原始 OCR 输出（带外接框、行号、置信度的文本片段）变成
//! 按阅读顺序编号的 WordToken 序列和 tag 映射

use crate::models::{OcrMapping, WordToken};

/// OCR 引擎原始输出的单个片段
///
/// 置信度保留引擎原生的字符串形式，解析失败的片段直接丢弃
#[derive(Debug, Clone)]
pub struct RawFragment {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub line_num: i32,
    pub conf: String,
}

/// 从原始片段提取带编号的单词
///
/// 规则：
/// 1. 丢弃文本为空白或置信度非正/不可解析的片段
/// 2. 剩余片段按 (line_num, left) 升序排序 —— 即标准阅读顺序
/// 3. 按该顺序从 1 开始分配 tag
/// 4. 拼接 "[tag] text" 形式的展示字符串（交给版面 LLM 的标准表示）
///
/// 没有任何有效片段时返回空映射和空字符串，下游必须能处理
pub fn extract_tagged_words(fragments: &[RawFragment]) -> (String, OcrMapping) {
    let mut words: Vec<&RawFragment> = fragments
        .iter()
        .filter(|f| {
            if f.text.trim().is_empty() {
                return false;
            }
            match f.conf.trim().parse::<f32>() {
                Ok(conf) => conf > 0.0,
                Err(_) => false,
            }
        })
        .collect();

    words.sort_by_key(|w| (w.line_num, w.left));

    let mut mapping = OcrMapping::new();
    let mut tagged_words = Vec::with_capacity(words.len());

    for (i, w) in words.iter().enumerate() {
        let tag = (i + 1) as u32;
        mapping.insert(
            tag,
            WordToken {
                tag,
                text: w.text.trim().to_string(),
                left: w.left,
                top: w.top,
                width: w.width,
                height: w.height,
                line_num: w.line_num,
            },
        );
        tagged_words.push(format!("[{}] {}", tag, w.text.trim()));
    }

    (tagged_words.join(" "), mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, left: i32, line: i32, conf: &str) -> RawFragment {
        RawFragment {
            text: text.to_string(),
            left,
            top: line * 30,
            width: 50,
            height: 20,
            line_num: line,
            conf: conf.to_string(),
        }
    }

    #[test]
    fn test_tags_are_monotonic_without_gaps() {
        let frags = vec![
            frag("world", 100, 1, "90.5"),
            frag("hello", 10, 1, "88.0"),
            frag("below", 10, 2, "95.0"),
        ];
        let (tagged, mapping) = extract_tagged_words(&frags);

        let tags: Vec<u32> = mapping.keys().copied().collect();
        assert_eq!(tags, vec![1, 2, 3]);
        // 阅读顺序：同行从左到右，再到下一行
        assert_eq!(mapping[&1].text, "hello");
        assert_eq!(mapping[&2].text, "world");
        assert_eq!(mapping[&3].text, "below");
        assert_eq!(tagged, "[1] hello [2] world [3] below");
    }

    #[test]
    fn test_discards_empty_and_low_confidence() {
        let frags = vec![
            frag("   ", 10, 1, "90"),
            frag("kept", 20, 1, "75"),
            frag("zero", 30, 1, "0"),
            frag("negative", 40, 1, "-1"),
            frag("badconf", 50, 1, "n/a"),
        ];
        let (tagged, mapping) = extract_tagged_words(&frags);
        assert_eq!(mapping.len(), 1);
        assert_eq!(tagged, "[1] kept");
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let (tagged, mapping) = extract_tagged_words(&[]);
        assert!(tagged.is_empty());
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_sort_is_by_line_then_left() {
        // 第二行的单词即使 left 更小，也排在第一行之后
        let frags = vec![frag("b", 5, 2, "80"), frag("a", 500, 1, "80")];
        let (_, mapping) = extract_tagged_words(&frags);
        assert_eq!(mapping[&1].text, "a");
        assert_eq!(mapping[&2].text, "b");
    }
}
