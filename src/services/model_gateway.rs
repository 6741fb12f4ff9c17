//! 模型网关 - 业务能力层
//!
//! 对外只提供三种能力：解析菜单、生成图片、编辑图片。
//! 负责构建提示词和解码响应，不持有任何会话状态，也不做自动重试。

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::clients::{
    ContentPart, ImageClient, ImageModel, ImageRequest, ImageTask, LlmClient, StructuredRequest,
    TextModel,
};
use crate::config::Config;
use crate::error::{EditError, ExtractionError, GenerationError};
use crate::models::{DishDraft, ImageRef, StyleConfig};
use crate::services::prompts;
use crate::utils::logging::truncate_text;

/// 模型网关
#[derive(Clone)]
pub struct ModelGateway {
    text_model: Arc<dyn TextModel>,
    image_model: Arc<dyn ImageModel>,
}

impl ModelGateway {
    pub fn new(text_model: Arc<dyn TextModel>, image_model: Arc<dyn ImageModel>) -> Self {
        Self {
            text_model,
            image_model,
        }
    }

    /// 使用真实的模型客户端
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(LlmClient::new(config)),
            Arc::new(ImageClient::new(config)),
        )
    }

    /// 从菜单文本中解析菜品
    ///
    /// 返回的列表保持菜单中的顺序；任何解析问题都会整体失败
    pub async fn extract(&self, menu_text: &str) -> Result<Vec<DishDraft>, ExtractionError> {
        if menu_text.trim().is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        info!("📋 正在解析菜单 ({} 字符)...", menu_text.chars().count());

        let raw = self
            .text_model
            .complete_structured(StructuredRequest {
                system_message: Some(prompts::MENU_SYSTEM_MESSAGE.to_string()),
                user_message: prompts::build_menu_prompt(menu_text),
                schema_name: prompts::MENU_SCHEMA_NAME.to_string(),
                schema: prompts::menu_schema(),
            })
            .await?;

        let drafts = parse_menu_response(&raw).map_err(|e| {
            warn!("菜单解析结果无效: {} (响应: {})", e, truncate_text(&raw, 120));
            e
        })?;

        info!("✓ 解析出 {} 道菜品", drafts.len());
        Ok(drafts)
    }

    /// 为一道菜生成图片
    ///
    /// 风格参数按值传入，调用期间的全局配置变化不会影响本次请求
    pub async fn synthesize(
        &self,
        name: &str,
        description: &str,
        style: StyleConfig,
    ) -> Result<ImageRef, GenerationError> {
        let prompt = prompts::build_photo_prompt(name, description, style.style);
        debug!("生成提示词: {}", prompt);

        let response = self
            .image_model
            .generate_content(ImageRequest {
                task: ImageTask::Synthesis,
                parts: vec![ContentPart::Text(prompt)],
                aspect_ratio: Some(style.style.aspect_ratio()),
                size: Some(style.size),
            })
            .await?;

        response
            .first_image()
            .map(|payload| payload.to_image_ref())
            .ok_or(GenerationError::NoImage)
    }

    /// 按指令编辑已有图片，返回新图片；原图不会被修改
    pub async fn edit(&self, image: &ImageRef, instruction: &str) -> Result<ImageRef, EditError> {
        let payload = image.to_payload()?;
        debug!(
            "编辑图片 ({})，指令: {}",
            payload.mime_type,
            truncate_text(instruction, 80)
        );

        let response = self
            .image_model
            .generate_content(ImageRequest {
                task: ImageTask::Edit,
                parts: vec![
                    ContentPart::Image(payload),
                    ContentPart::Text(instruction.to_string()),
                ],
                aspect_ratio: None,
                size: None,
            })
            .await?;

        response
            .first_image()
            .map(|payload| payload.to_image_ref())
            .ok_or(EditError::NoImage)
    }
}

// ========== 响应解析 ==========

#[derive(Debug, Deserialize)]
struct MenuResponse {
    dishes: Vec<MenuDish>,
}

#[derive(Debug, Deserialize)]
struct MenuDish {
    name: String,
    description: String,
}

fn code_fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("代码块正则表达式无效")
    })
}

/// 去掉部分兼容接口会包裹在 JSON 外面的 Markdown 代码块
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    code_fence_pattern()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed)
}

fn parse_menu_response(raw: &str) -> Result<Vec<DishDraft>, ExtractionError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    let value: JsonValue = serde_json::from_str(body).map_err(ExtractionError::Malformed)?;
    let menu: MenuResponse = serde_json::from_value(value)
        .map_err(|e| ExtractionError::SchemaViolation(e.to_string()))?;

    if menu.dishes.is_empty() {
        return Err(ExtractionError::NoDishes);
    }

    menu.dishes
        .into_iter()
        .enumerate()
        .map(|(index, dish)| {
            let name = dish.name.trim();
            let description = dish.description.trim();
            if name.is_empty() {
                return Err(ExtractionError::SchemaViolation(format!(
                    "第 {} 道菜缺少名称",
                    index + 1
                )));
            }
            if description.is_empty() {
                return Err(ExtractionError::SchemaViolation(format!(
                    "菜品 '{}' 缺少描述",
                    name
                )));
            }
            Ok(DishDraft::new(name, description))
        })
        .collect()
}
