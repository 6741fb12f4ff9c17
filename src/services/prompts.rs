//! 提示词与响应结构约定

use serde_json::{json, Value as JsonValue};

use crate::models::PhotoStyle;

pub const MENU_SCHEMA_NAME: &str = "menu_extraction";

pub const MENU_SYSTEM_MESSAGE: &str =
    "You extract dishes from restaurant menus and answer only with JSON matching the given schema.";

const PHOTO_PREAMBLE: &str = "Professional food photography of";

const PHOTO_SUFFIX: &str = "Highly detailed, appetizing, 8k resolution.";

/// 菜单解析的用户消息
///
/// 描述缺失时要求模型根据菜名推断，而不是留空
pub fn build_menu_prompt(menu_text: &str) -> String {
    format!(
        r#"Extract a list of dishes from the following menu text. For each dish, provide a 'name' and a short visual 'description' suitable for an image generator. If the description is missing in the text, infer a tasty one based on the name. Never leave a description empty.

Menu Text:
{}"#,
        menu_text
    )
}

/// `{dishes: [{name, description}]}`，所有字段必填
pub fn menu_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "dishes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["name", "description"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["dishes"],
        "additionalProperties": false
    })
}

/// 各风格固定的视觉描述
pub fn style_fragment(style: PhotoStyle) -> &'static str {
    match style {
        PhotoStyle::Rustic => "Rustic aesthetic, dark moody lighting, wooden table texture, chiaroscuro, warm tones, professional culinary photography, 85mm lens.",
        PhotoStyle::Bright => "Bright and modern aesthetic, high-key lighting, clean white or marble background, sharp focus, minimalist, vibrant colors, commercial food photography.",
        PhotoStyle::Social => "Social media aesthetic, flat lay, top-down view, trendy plating, perfect lighting for Instagram, high saturation, sharp details.",
    }
}

/// 单道菜的生成提示词
pub fn build_photo_prompt(name: &str, description: &str, style: PhotoStyle) -> String {
    format!(
        "{} {}: {}. {} {}",
        PHOTO_PREAMBLE,
        name.trim(),
        description.trim(),
        style_fragment(style),
        PHOTO_SUFFIX
    )
}
