//! AI 版面解析服务
//!
//! 把带编号的 OCR 文本交给 LLM，请它切分出 {question, answers}。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型（兼容 OpenAI API 的服务）
//!
//! 响应中任何无法解析为 JSON 的内容都按整体失败处理（None），
//! 不存在部分成功；失败时流水线只用几何兜底结构继续。

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Answer, StructuredQuestion};

/// AI 版面解析服务
pub struct LayoutService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LayoutService {
    /// 创建新的版面解析服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.layout_api_key)
            .with_api_base(&config.layout_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.layout_model_name.clone(),
        }
    }

    /// 请求 LLM 把带编号的 OCR 文本重组为 {question, answers}
    ///
    /// 任何失败（网络、空响应、非 JSON）都返回 None，
    /// 由调用方退回纯几何兜底
    pub async fn structure_layout(&self, tagged_text: &str) -> Option<StructuredQuestion> {
        debug!("发送 OCR 文本给 LLM 做版面切分，模型: {}", self.model_name);

        match self.call_llm(tagged_text).await {
            Ok(raw) => {
                debug!("版面切分响应: {}", raw);
                let parsed = parse_ai_structure(&raw);
                if parsed.is_none() {
                    warn!("版面切分响应不是有效 JSON，整体按失败处理");
                }
                parsed
            }
            Err(e) => {
                warn!("版面切分调用失败: {}", e);
                None
            }
        }
    }

    async fn call_llm(&self, tagged_text: &str) -> Result<String> {
        let prompt = build_layout_prompt(tagged_text);

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.0)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}

/// 构建版面切分提示词
fn build_layout_prompt(tagged_text: &str) -> String {
    format!(
        "The following is raw OCR output from a quiz screen. Each word is \
         prefixed with its position tag in brackets, e.g. \"[12] word\". \
         Restructure it into a JSON object with two keys: 'question' and \
         'answers'. The 'question' value is the quiz question as a string. \
         The 'answers' value is an object mapping the bracket tag of each \
         answer option's first word to that option's text, e.g. \
         {{\"14\": \"Paris\", \"16\": \"London\"}}. \
         Do not add any labels or extra text. Return only valid JSON.\n\n\
         OCR Output:\n{}",
        tagged_text
    )
}

/// 解析 LLM 的版面切分响应
///
/// 支持两种 answers 形态：
/// - 对象：键是 LLM 照抄的屏幕编号 —— 编号原样保留作为锚点 tag，
///   仅按数值排序后重映射为连续位置键 "1".."N"，绝不重新编号
/// - 数组：LLM 只复述了文本，位置键按出现顺序 1..N，tag 置空待修复
///
/// 非 JSON（含剥掉 ``` 围栏后仍非 JSON）返回 None
pub fn parse_ai_structure(raw: &str) -> Option<StructuredQuestion> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(cleaned).ok()?;

    let question = value
        .get("question")
        .and_then(|q| q.as_str())
        .unwrap_or("")
        .to_string();

    let answers = match value.get("answers") {
        Some(Value::Object(map)) => {
            // 键必须全部是数字编号，混入非数字键按整体失败处理
            let mut tagged: Vec<(u32, String)> = Vec::with_capacity(map.len());
            for (key, val) in map {
                let tag: u32 = key.trim().parse().ok()?;
                let text = answer_text(val)?;
                tagged.push((tag, text));
            }
            tagged.sort_by_key(|(tag, _)| *tag);

            tagged
                .into_iter()
                .enumerate()
                .map(|(i, (tag, text))| ((i + 1) as u32, Answer::new(text, Some(tag))))
                .collect()
        }
        Some(Value::Array(list)) => list
            .iter()
            .enumerate()
            .filter_map(|(i, val)| {
                answer_text(val).map(|text| ((i + 1) as u32, Answer::new(text, None)))
            })
            .collect(),
        _ => BTreeMap::new(),
    };

    Some(StructuredQuestion { question, answers })
}

/// 选项值可能是纯字符串，也可能是 {"text": ..., "tag": ...} 对象
fn answer_text(val: &Value) -> Option<String> {
    match val {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj
            .get("text")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string()),
        _ => None,
    }
}

/// 剥掉 ```json ... ``` 围栏
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_answers_keeps_tags_verbatim() {
        let raw = r#"{"question": "What is the capital of France?",
                      "answers": {"16": "London", "14": "Paris", "20": "Rome"}}"#;
        let s = parse_ai_structure(raw).unwrap();

        assert_eq!(s.question, "What is the capital of France?");
        // 按编号数值排序后重映射位置键，原编号保留为 tag
        assert_eq!(s.answers[&1].text, "Paris");
        assert_eq!(s.answers[&1].tag, Some(14));
        assert_eq!(s.answers[&2].text, "London");
        assert_eq!(s.answers[&2].tag, Some(16));
        assert_eq!(s.answers[&3].tag, Some(20));
    }

    #[test]
    fn test_parse_array_answers_have_no_tags() {
        let raw = r#"{"question": "q", "answers": ["Paris", "London"]}"#;
        let s = parse_ai_structure(raw).unwrap();

        assert_eq!(s.answers[&1].text, "Paris");
        assert_eq!(s.answers[&1].tag, None);
        assert_eq!(s.answers[&2].text, "London");
        assert_eq!(s.answers[&2].tag, None);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_ai_structure("I could not parse the OCR text.").is_none());
        assert!(parse_ai_structure("").is_none());
    }

    #[test]
    fn test_parse_strips_code_fences() {
        let raw = "```json\n{\"question\": \"q\", \"answers\": [\"a\"]}\n```";
        let s = parse_ai_structure(raw).unwrap();
        assert_eq!(s.question, "q");
        assert_eq!(s.answers.len(), 1);
    }

    #[test]
    fn test_parse_rejects_non_numeric_object_keys() {
        let raw = r#"{"question": "q", "answers": {"A": "Paris"}}"#;
        assert!(parse_ai_structure(raw).is_none());
    }

    #[test]
    fn test_missing_answers_yields_empty_set() {
        let s = parse_ai_structure(r#"{"question": "q"}"#).unwrap();
        assert!(s.answers.is_empty());
    }
}
