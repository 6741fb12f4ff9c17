//! 模型客户端
//!
//! 只负责和外部模型服务通信，不关心菜品、状态或提示词内容。
//! 上层通过 `TextModel` / `ImageModel` 两个 trait 使用，测试时可以替换成假实现。

pub mod image_client;
pub mod llm_client;

pub use image_client::ImageClient;
pub use llm_client::LlmClient;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::ApiError;
use crate::models::{AspectRatio, ImagePayload, ImageSize};

/// 结构化文本请求：要求模型按 JSON Schema 返回
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system_message: Option<String>,
    pub user_message: String,
    pub schema_name: String,
    pub schema: JsonValue,
}

/// 文本模型能力
#[async_trait]
pub trait TextModel: Send + Sync {
    /// 返回模型输出的原始文本（应当是符合 schema 的 JSON）
    async fn complete_structured(&self, request: StructuredRequest) -> Result<String, ApiError>;
}

/// 图片请求用途，决定使用哪个模型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTask {
    Synthesis,
    Edit,
}

/// 请求或响应中的一段内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Image(ImagePayload),
}

/// 图片生成 / 编辑请求
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub task: ImageTask,
    pub parts: Vec<ContentPart>,
    pub aspect_ratio: Option<AspectRatio>,
    pub size: Option<ImageSize>,
}

/// 图片模型响应，按顺序保留所有内容片段
#[derive(Debug, Clone, Default)]
pub struct ImageResponse {
    pub parts: Vec<ContentPart>,
}

impl ImageResponse {
    /// 取第一张图片
    pub fn first_image(self) -> Option<ImagePayload> {
        self.parts.into_iter().find_map(|part| match part {
            ContentPart::Image(payload) => Some(payload),
            ContentPart::Text(_) => None,
        })
    }
}

/// 图片模型能力
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate_content(&self, request: ImageRequest) -> Result<ImageResponse, ApiError>;
}
