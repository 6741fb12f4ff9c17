/// 图片模型客户端
///
/// 调用 Gemini `generateContent` 接口生成或编辑图片
use crate::clients::{ContentPart, ImageModel, ImageRequest, ImageResponse, ImageTask};
use crate::config::Config;
use crate::error::ApiError;
use crate::models::ImagePayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 图片模型客户端
pub struct ImageClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    synthesis_model: String,
    edit_model: String,
}

impl ImageClient {
    /// 创建新的图片客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.image_api_base_url.trim_end_matches('/').to_string(),
            synthesis_model: config.image_model_name.clone(),
            edit_model: config.edit_model_name.clone(),
        }
    }

    fn model_for(&self, task: ImageTask) -> &str {
        match task {
            ImageTask::Synthesis => &self.synthesis_model,
            ImageTask::Edit => &self.edit_model,
        }
    }

    fn endpoint(&self, task: ImageTask) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_for(task))
    }
}

#[async_trait]
impl ImageModel for ImageClient {
    async fn generate_content(&self, request: ImageRequest) -> Result<ImageResponse, ApiError> {
        let endpoint = self.endpoint(request.task);
        debug!(
            "调用图片 API，模型: {}，比例: {:?}，尺寸: {:?}",
            self.model_for(request.task),
            request.aspect_ratio,
            request.size
        );

        let body = GenerateContentRequest::from(request);

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("图片 API 请求失败: {}", e);
                ApiError::request_failed(&endpoint, e)
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::request_failed(&endpoint, e))?;

        if !status.is_success() {
            warn!("图片 API 返回错误状态: {}", status);
            return Err(ApiError::BadStatus {
                endpoint,
                status: status.as_u16(),
                body: text,
            });
        }

        let decoded: GenerateContentResponse = serde_json::from_str(&text)?;
        debug!("图片 API 调用成功");

        Ok(decoded.into())
    }
}

// ========== 接口数据结构 ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<ImagePayload>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    response_modalities: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<WireImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireImageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_size: Option<&'static str>,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireContent>,
}

impl From<ImageRequest> for GenerateContentRequest {
    fn from(request: ImageRequest) -> Self {
        let parts = request
            .parts
            .into_iter()
            .map(|part| match part {
                ContentPart::Text(text) => WirePart {
                    text: Some(text),
                    inline_data: None,
                },
                ContentPart::Image(payload) => WirePart {
                    text: None,
                    inline_data: Some(payload),
                },
            })
            .collect();

        let image_config = if request.aspect_ratio.is_some() || request.size.is_some() {
            Some(WireImageConfig {
                aspect_ratio: request.aspect_ratio.map(|r| r.as_str()),
                image_size: request.size.map(|s| s.tier()),
            })
        } else {
            None
        };

        Self {
            contents: vec![WireContent { parts }],
            generation_config: WireGenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
                image_config,
            },
        }
    }
}

impl From<GenerateContentResponse> for ImageResponse {
    /// 只看第一个候选结果
    fn from(response: GenerateContentResponse) -> Self {
        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| match (part.inline_data, part.text) {
                (Some(payload), _) => Some(ContentPart::Image(payload)),
                (None, Some(text)) => Some(ContentPart::Text(text)),
                (None, None) => None,
            })
            .collect();

        ImageResponse { parts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AspectRatio, ImageSize};
    use serde_json::json;

    #[test]
    fn test_synthesis_request_shape() {
        let request = ImageRequest {
            task: ImageTask::Synthesis,
            parts: vec![ContentPart::Text("a burger".to_string())],
            aspect_ratio: Some(AspectRatio::Portrait),
            size: Some(ImageSize::Medium),
        };

        let body = serde_json::to_value(GenerateContentRequest::from(request)).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{ "parts": [{ "text": "a burger" }] }],
                "generationConfig": {
                    "responseModalities": ["TEXT", "IMAGE"],
                    "imageConfig": { "aspectRatio": "4:5", "imageSize": "2K" }
                }
            })
        );
    }

    #[test]
    fn test_edit_request_carries_inline_image() {
        let request = ImageRequest {
            task: ImageTask::Edit,
            parts: vec![
                ContentPart::Image(ImagePayload::new("image/jpeg", "QUJD")),
                ContentPart::Text("add steam".to_string()),
            ],
            aspect_ratio: None,
            size: None,
        };

        let body = serde_json::to_value(GenerateContentRequest::from(request)).unwrap();

        assert_eq!(
            body["contents"][0]["parts"][0]["inlineData"],
            json!({ "mimeType": "image/jpeg", "data": "QUJD" })
        );
        assert_eq!(body["contents"][0]["parts"][1]["text"], "add steam");
        assert!(body["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn test_response_decoding_takes_first_candidate() {
        let raw = json!({
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [
                            { "text": "Here is your dish" },
                            { "inlineData": { "mimeType": "image/png", "data": "Zmlyc3Q=" } }
                        ]
                    },
                    "finishReason": "STOP"
                },
                {
                    "content": {
                        "parts": [{ "inlineData": { "mimeType": "image/png", "data": "b3RoZXI=" } }]
                    }
                }
            ]
        });

        let decoded: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let response = ImageResponse::from(decoded);

        assert_eq!(response.parts.len(), 2);
        assert_eq!(response.first_image().unwrap().data, "Zmlyc3Q=");
    }

    #[test]
    fn test_response_without_candidates() {
        let decoded: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert!(ImageResponse::from(decoded).parts.is_empty());
    }

    #[test]
    fn test_endpoint_uses_task_model() {
        let client = ImageClient::new(&Config {
            image_api_base_url: "https://example.test/v1beta/".to_string(),
            ..Default::default()
        });
        assert_eq!(
            client.endpoint(ImageTask::Edit),
            "https://example.test/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        assert_eq!(
            client.endpoint(ImageTask::Synthesis),
            "https://example.test/v1beta/models/gemini-3-pro-image-preview:generateContent"
        );
    }
}
