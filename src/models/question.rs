//! 结构化题目数据模型

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个答案选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// 指向 OcrMapping 的锚点 tag（引用而非所有权）
    ///
    /// None 表示锚点未解析，必须先修复才可点击；
    /// 合并完成后仍为 None 的选项对下游是不可用的
    #[serde(default)]
    pub tag: Option<u32>,
}

impl Answer {
    pub fn new(text: impl Into<String>, tag: Option<u32>) -> Self {
        Self {
            text: text.into(),
            tag,
        }
    }
}

/// 结构化题目：题干 + 位置键("1".."N")到选项的映射
///
/// 不变量：位置键是从 1 开始的连续整数，N 等于本轮期望/观测到的选项数。
/// serde_json 序列化时 u32 键自动写成字符串键（"1"、"2"……）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StructuredQuestion {
    pub question: String,
    #[serde(default)]
    pub answers: BTreeMap<u32, Answer>,
}

impl StructuredQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answers: BTreeMap::new(),
        }
    }

    /// 是否还有未解析锚点的选项
    pub fn has_untagged_answers(&self) -> bool {
        self.answers.values().any(|a| a.tag.is_none())
    }

    /// 列出所有未解析锚点的位置键
    pub fn untagged_keys(&self) -> Vec<u32> {
        self.answers
            .iter()
            .filter(|(_, a)| a.tag.is_none())
            .map(|(k, _)| *k)
            .collect()
    }
}
