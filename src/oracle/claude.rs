//! Anthropic Claude oracle 适配器
//!
//! Messages API 走 reqwest 直连，响应体形态
//! `{"content": [{"type": "text", "text": "..."}]}` 的拆解只发生在这里

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{build_answer_prompt, normalize, AnswerOracle};
use crate::config::Config;
use crate::models::StructuredQuestion;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeOracle {
    client: reqwest::Client,
    api_key: String,
    model_name: String,
}

impl ClaudeOracle {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.claude_api_key.clone(),
            model_name: config.claude_model_name.clone(),
        }
    }

    async fn call(&self, prompt: &str) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model_name,
            "max_tokens": 100,
            "temperature": 0.0,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let value: Value = response.json().await?;
        extract_text(&value).ok_or_else(|| anyhow::anyhow!("Claude 响应缺少文本内容"))
    }
}

/// 拼接 content 数组里所有 text 块
fn extract_text(value: &Value) -> Option<String> {
    let blocks = value.get("content")?.as_array()?;
    let text = blocks
        .iter()
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join(" ");
    if text.trim().is_empty() {
        None
    } else {
        Some(text.trim().to_string())
    }
}

#[async_trait]
impl AnswerOracle for ClaudeOracle {
    fn name(&self) -> &str {
        "claude"
    }

    async fn answer(&self, question: &StructuredQuestion) -> Option<u32> {
        let prompt = build_answer_prompt(question);
        debug!("🟡 向 Claude 提问，模型: {}", self.model_name);

        match self.call(&prompt).await {
            Ok(raw) => {
                debug!("📨 Claude 响应: {}", raw);
                let index = normalize::extract_index(&raw);
                if index.is_none() {
                    warn!("❓ Claude 响应无法归一化为序号: {}", raw);
                }
                index
            }
            Err(e) => {
                warn!("🔥 Claude 调用失败: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_from_content_blocks() {
        let value = json!({
            "content": [
                {"type": "text", "text": "Answer:"},
                {"type": "text", "text": "3"}
            ]
        });
        assert_eq!(extract_text(&value).unwrap(), "Answer: 3");
    }

    #[test]
    fn test_extract_text_rejects_empty_content() {
        assert!(extract_text(&json!({"content": []})).is_none());
        assert!(extract_text(&json!({"error": "overloaded"})).is_none());
    }
}
