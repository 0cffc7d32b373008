//! 几何兜底结构
//!
//! 不依赖任何 AI，仅凭行版面推断题干和选项的边界，
//! 保证 AI 调用完全失败时仍有一个带锚点的结构可用。
//!
//! 版面先验：典型答题界面题干占上方若干行，每个选项独占底部一行。
//! 这个先验很强但并非总成立。

use crate::models::{Answer, OcrMapping, StructuredQuestion};
use std::collections::BTreeMap;

/// 从 OCR 映射构建几何兜底结构
///
/// 算法：
/// 1. 按 line_num 分组，组内按 tag 排序，空格拼接为行文本，
///    记录首个 tag 作为该行的锚点
/// 2. 行数 <= expected_answers 时是退化情形：全部文本作为题干、
///    选项为空 —— 版面信息不足以分离题干和选项，这是已知局限而非错误
/// 3. 否则最后 expected_answers 行依次成为选项 "1".."N"，
///    其余行拼接为题干
pub fn fallback_structure(mapping: &OcrMapping, expected_answers: usize) -> StructuredQuestion {
    // BTreeMap 保证行按 line_num 升序
    let mut lines: BTreeMap<i32, Vec<(u32, &str)>> = BTreeMap::new();
    for (tag, word) in mapping {
        lines
            .entry(word.line_num)
            .or_default()
            .push((*tag, word.text.as_str()));
    }

    let mut line_texts: Vec<String> = Vec::with_capacity(lines.len());
    let mut line_tags: Vec<u32> = Vec::with_capacity(lines.len());

    for (_, mut words) in lines {
        words.sort_by_key(|(tag, _)| *tag);
        let first_tag = words[0].0;
        let text = words
            .iter()
            .map(|(_, t)| *t)
            .collect::<Vec<_>>()
            .join(" ");
        line_texts.push(text);
        line_tags.push(first_tag);
    }

    let total_lines = line_texts.len();

    if total_lines <= expected_answers {
        return StructuredQuestion {
            question: line_texts.join(" "),
            answers: BTreeMap::new(),
        };
    }

    let split = total_lines - expected_answers;
    let question = line_texts[..split].join(" ");

    let mut answers = BTreeMap::new();
    for i in 0..expected_answers {
        answers.insert(
            (i + 1) as u32,
            Answer::new(line_texts[split + i].clone(), Some(line_tags[split + i])),
        );
    }

    StructuredQuestion { question, answers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WordToken;

    fn word(tag: u32, text: &str, line: i32, left: i32) -> WordToken {
        WordToken {
            tag,
            text: text.to_string(),
            left,
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
    fn test_degenerate_case_too_few_lines() {
        // 行数 <= 期望选项数：全部文本作为题干，无选项
        let mapping = mapping_of(vec![
            word(1, "只有", 1, 0),
            word(2, "两行", 1, 50),
            word(3, "文本", 2, 0),
        ]);
        let s = fallback_structure(&mapping, 4);
        assert_eq!(s.question, "只有 两行 文本");
        assert!(s.answers.is_empty());
    }

    #[test]
    fn test_normal_case_six_lines_four_answers() {
        let mapping = mapping_of(vec![
            word(1, "题干", 1, 0),
            word(2, "第一行", 1, 50),
            word(3, "题干第二行", 2, 0),
            word(4, "选项A", 3, 0),
            word(5, "选项B", 4, 0),
            word(6, "选项C", 5, 0),
            word(7, "选项D", 6, 0),
        ]);
        let s = fallback_structure(&mapping, 4);

        assert_eq!(s.question, "题干 第一行 题干第二行");
        assert_eq!(s.answers.len(), 4);
        assert_eq!(s.answers[&1].text, "选项A");
        assert_eq!(s.answers[&1].tag, Some(4));
        assert_eq!(s.answers[&2].tag, Some(5));
        assert_eq!(s.answers[&3].tag, Some(6));
        assert_eq!(s.answers[&4].text, "选项D");
        assert_eq!(s.answers[&4].tag, Some(7));
    }

    #[test]
    fn test_anchor_is_first_tag_of_line() {
        // 一行多个单词时锚点取 tag 最小的那个
        let mapping = mapping_of(vec![
            word(1, "q", 1, 0),
            word(2, "选项", 2, 0),
            word(3, "甲", 2, 60),
        ]);
        let s = fallback_structure(&mapping, 1);
        assert_eq!(s.answers[&1].text, "选项 甲");
        assert_eq!(s.answers[&1].tag, Some(2));
    }

    #[test]
    fn test_empty_mapping() {
        let s = fallback_structure(&OcrMapping::new(), 4);
        assert!(s.question.is_empty());
        assert!(s.answers.is_empty());
    }
}
