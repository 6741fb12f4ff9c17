//! 图片引用
//!
//! 图片在会话中以 `data:<mime>;base64,<data>` 形式保存，
//! 调用编辑接口时再拆回原始负载 + 媒体类型

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::utils::logging::truncate_text;

const DEFAULT_MIME_TYPE: &str = "image/png";
/// 菜名为空白时的文件名
const DEFAULT_FILE_STEM: &str = "dish";

/// 图片原始负载（base64 数据 + 媒体类型）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub mime_type: String,
    /// base64 编码后的数据
    pub data: String,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// 从原始字节构建
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, BASE64.encode(bytes))
    }

    /// 转换成可直接展示的 data URI
    pub fn to_image_ref(&self) -> ImageRef {
        let mime = if self.mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE
        } else {
            self.mime_type.as_str()
        };
        ImageRef(format!("data:{};base64,{}", mime, self.data))
    }
}

/// 不透明的图片句柄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

fn data_uri_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^data:([^;,]*)(?:;[^,]*)?,(.+)$").expect("data URI 正则表达式无效")
    })
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("空白正则表达式无效"))
}

impl ImageRef {
    /// 包装一个已有的 data URI
    pub fn from_data_uri(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 拆分为原始负载 + 媒体类型
    ///
    /// 缺少媒体类型时按 `image/png` 处理
    pub fn to_payload(&self) -> Result<ImagePayload, EditError> {
        let caps = data_uri_pattern()
            .captures(self.0.trim())
            .ok_or_else(|| EditError::InvalidImage("不是 data URI".to_string()))?;

        let mime = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let data = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        Ok(ImagePayload::new(
            if mime.is_empty() { DEFAULT_MIME_TYPE } else { mime },
            data,
        ))
    }

    /// 解码出图片字节
    pub fn decode_bytes(&self) -> Result<Vec<u8>, EditError> {
        let payload = self.to_payload()?;
        BASE64
            .decode(payload.data.as_bytes())
            .map_err(|e| EditError::InvalidImage(e.to_string()))
    }

    /// 下载时使用的文件名：菜名空白替换为下划线，扩展名取自媒体类型
    pub fn download_file_name(&self, dish_name: &str) -> String {
        let stem = whitespace_pattern().replace_all(dish_name.trim(), "_");
        let stem = match stem.replace(['/', '\\'], "_") {
            stem if stem.is_empty() => DEFAULT_FILE_STEM.to_string(),
            stem => stem,
        };
        let extension = self
            .to_payload()
            .ok()
            .and_then(|p| extension_for(&p.mime_type))
            .unwrap_or("png");
        format!("{}.{}", stem, extension)
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // data URI 可能很长，只显示开头
        write!(f, "{}", truncate_text(&self.0, 48))
    }
}

fn extension_for(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
