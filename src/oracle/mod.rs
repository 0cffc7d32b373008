//! 答案 oracle 抽象
//!
//! 每个 oracle 是一个外部答题服务：输入结构化题目，
//! 输出 1 开始的选项序号，失败/不可解析一律退化为 None。
//! 各家返回体形态差异很大，解析逻辑全部留在各自适配器内部，
//! 绝不泄漏进投票器。

pub mod claude;
pub mod cohere;
pub mod normalize;
pub mod openai;
pub mod voter;

pub use claude::ClaudeOracle;
pub use cohere::CohereOracle;
pub use normalize::extract_index;
pub use openai::OpenAiOracle;
pub use voter::ConsensusVoter;

use crate::models::StructuredQuestion;
use async_trait::async_trait;

/// 答案 oracle 能力
///
/// 实现方负责把自家响应归一化为选项序号；
/// 网络错误、格式错误、超范围都返回 None，不向外抛错
#[async_trait]
pub trait AnswerOracle: Send + Sync {
    /// oracle 名称（仅用于日志）
    fn name(&self) -> &str;

    /// 回答题目，返回 1 开始的选项序号，失败返回 None
    async fn answer(&self, question: &StructuredQuestion) -> Option<u32>;
}

/// 构建发给所有 oracle 的统一提示词
///
/// 题目 JSON 原样嵌入，要求只返回选项序号。
/// 提示词是固定模板，保证同一题目发给三方的内容完全一致。
pub fn build_answer_prompt(question: &StructuredQuestion) -> String {
    let question_json =
        serde_json::to_string(question).unwrap_or_else(|_| question.question.clone());
    format!(
        "Here is the OCR output in JSON format:\n{}\nBased on the above, \
         which answer option is correct? Return only the number corresponding \
         to the correct answer with no extra text.",
        question_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Answer;

    #[test]
    fn test_prompt_embeds_question_json_verbatim() {
        let mut q = StructuredQuestion::new("首都是哪里？");
        q.answers.insert(1, Answer::new("北京", Some(3)));

        let prompt = build_answer_prompt(&q);
        assert!(prompt.contains("首都是哪里？"));
        assert!(prompt.contains(r#""1":{"text":"北京","tag":3}"#));
        assert!(prompt.contains("Return only the number"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let q = StructuredQuestion::new("q");
        assert_eq!(build_answer_prompt(&q), build_answer_prompt(&q));
    }
}
