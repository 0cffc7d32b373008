//! OpenAI oracle 适配器
//!
//! 使用 `async-openai` crate，兼容任何 OpenAI API 形态的端点

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use super::{build_answer_prompt, normalize, AnswerOracle};
use crate::config::Config;
use crate::models::StructuredQuestion;

pub struct OpenAiOracle {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiOracle {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.openai_api_key)
            .with_api_base(&config.openai_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.openai_model_name.clone(),
        }
    }

    async fn call(&self, prompt: &str) -> anyhow::Result<String> {
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.0)
            .build()?;

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|c| c.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("OpenAI 返回内容为空"))
    }
}

#[async_trait]
impl AnswerOracle for OpenAiOracle {
    fn name(&self) -> &str {
        "openai"
    }

    async fn answer(&self, question: &StructuredQuestion) -> Option<u32> {
        let prompt = build_answer_prompt(question);
        debug!("🟢 向 OpenAI 提问，模型: {}", self.model_name);

        match self.call(&prompt).await {
            Ok(raw) => {
                debug!("📨 OpenAI 响应: {}", raw);
                let index = normalize::extract_index(&raw);
                if index.is_none() {
                    warn!("❓ OpenAI 响应无法归一化为序号: {}", raw);
                }
                index
            }
            Err(e) => {
                warn!("🔥 OpenAI 调用失败: {}", e);
                None
            }
        }
    }
}
