/// LLM API 客户端
///
/// 使用 `async-openai` 调用兼容 OpenAI 的接口（Gemini 的 OpenAI 兼容端点同样可用），
/// 通过 `response_format = json_schema` 要求模型返回结构化结果
use crate::clients::{StructuredRequest, TextModel};
use crate::config::Config;
use crate::error::ApiError;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

const ENDPOINT: &str = "chat/completions";

/// LLM 客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.text_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.text_model_name.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// 严格模式的 json_schema 输出格式
fn json_schema_format(name: String, schema: serde_json::Value) -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: None,
            name,
            schema: Some(schema),
            strict: Some(true),
        },
    }
}

#[async_trait]
impl TextModel for LlmClient {
    async fn complete_structured(&self, request: StructuredRequest) -> Result<String, ApiError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", request.user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = &request.system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg.as_str())
                .build()
                .map_err(|e| ApiError::request_failed(ENDPOINT, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_message.as_str())
            .build()
            .map_err(|e| ApiError::request_failed(ENDPOINT, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let response_format = json_schema_format(request.schema_name, request.schema);

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.2)
            .response_format(response_format)
            .build()
            .map_err(|e| ApiError::request_failed(ENDPOINT, e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            ApiError::request_failed(ENDPOINT, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uses_configured_model() {
        let config = Config {
            api_key: "test-key".to_string(),
            text_model_name: "gemini-2.5-flash".to_string(),
            ..Default::default()
        };
        let client = LlmClient::new(&config);
        assert_eq!(client.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn test_json_schema_format_is_strict() {
        let format = json_schema_format("menu".to_string(), json!({ "type": "object" }));
        let value = serde_json::to_value(&format).unwrap();

        assert_eq!(value["type"], "json_schema");
        assert_eq!(value["json_schema"]["name"], "menu");
        assert_eq!(value["json_schema"]["strict"], true);
        assert_eq!(value["json_schema"]["schema"]["type"], "object");
    }

    /// 需要真实 API Key：
    /// ```bash
    /// GEMINI_API_KEY=... cargo test test_live_structured_call -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_structured_call() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = LlmClient::new(&Config::from_env());
        let result = client
            .complete_structured(StructuredRequest {
                system_message: None,
                user_message: "List one fruit.".to_string(),
                schema_name: "fruit".to_string(),
                schema: json!({
                    "type": "object",
                    "properties": { "name": { "type": "string" } },
                    "required": ["name"],
                    "additionalProperties": false
                }),
            })
            .await;

        match result {
            Ok(response) => {
                println!("LLM 响应: {}", response);
                assert!(!response.is_empty());
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
