//! Cohere oracle 适配器
//!
//! v2 chat 接口走 reqwest 直连，响应体形态
//! `{"message": {"content": [{"type": "text", "text": "..."}]}}`

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{build_answer_prompt, normalize, AnswerOracle};
use crate::config::Config;
use crate::models::StructuredQuestion;

const COHERE_API_URL: &str = "https://api.cohere.com/v2/chat";

pub struct CohereOracle {
    client: reqwest::Client,
    api_key: String,
    model_name: String,
}

impl CohereOracle {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.cohere_api_key.clone(),
            model_name: config.cohere_model_name.clone(),
        }
    }

    async fn call(&self, prompt: &str) -> anyhow::Result<String> {
        let body = json!({
            "model": self.model_name,
            "temperature": 0.0,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(COHERE_API_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let value: Value = response.json().await?;
        extract_text(&value).ok_or_else(|| anyhow::anyhow!("Cohere 响应缺少文本内容"))
    }
}

fn extract_text(value: &Value) -> Option<String> {
    let blocks = value.get("message")?.get("content")?.as_array()?;
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
impl AnswerOracle for CohereOracle {
    fn name(&self) -> &str {
        "cohere"
    }

    async fn answer(&self, question: &StructuredQuestion) -> Option<u32> {
        let prompt = build_answer_prompt(question);
        debug!("🔵 向 Cohere 提问，模型: {}", self.model_name);

        match self.call(&prompt).await {
            Ok(raw) => {
                debug!("📨 Cohere 响应: {}", raw);
                let index = normalize::extract_index(&raw);
                if index.is_none() {
                    warn!("❓ Cohere 响应无法归一化为序号: {}", raw);
                }
                index
            }
            Err(e) => {
                warn!("🔥 Cohere 调用失败: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_from_v2_chat_shape() {
        let value = json!({
            "message": {
                "content": [{"type": "text", "text": " 4 "}]
            }
        });
        assert_eq!(extract_text(&value).unwrap(), "4");
    }

    #[test]
    fn test_extract_text_rejects_missing_message() {
        assert!(extract_text(&json!({"text": "4"})).is_none());
    }
}
