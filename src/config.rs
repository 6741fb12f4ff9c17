use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::{ImageSize, PhotoStyle, StyleConfig};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 模型 API Key（同时用于文本和图片接口）
    pub api_key: String,
    // --- 文本模型（菜单解析）配置 ---
    pub text_api_base_url: String,
    pub text_model_name: String,
    // --- 图片模型配置 ---
    pub image_api_base_url: String,
    pub image_model_name: String,
    pub edit_model_name: String,
    /// 默认摄影风格
    pub default_style: PhotoStyle,
    /// 默认分辨率
    pub default_size: ImageSize,
    /// 批量生成时同时请求的数量，0 表示不限制
    pub max_concurrent_generations: usize,
    /// 图片输出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            text_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            text_model_name: "gemini-2.5-flash".to_string(),
            image_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            image_model_name: "gemini-3-pro-image-preview".to_string(),
            edit_model_name: "gemini-2.5-flash-image".to_string(),
            default_style: PhotoStyle::Bright,
            default_size: ImageSize::Low,
            max_concurrent_generations: 4,
            output_dir: "output_photos".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .unwrap_or(default.api_key),
            text_api_base_url: std::env::var("TEXT_API_BASE_URL").unwrap_or(default.text_api_base_url),
            text_model_name: std::env::var("TEXT_MODEL_NAME").unwrap_or(default.text_model_name),
            image_api_base_url: std::env::var("IMAGE_API_BASE_URL").unwrap_or(default.image_api_base_url),
            image_model_name: std::env::var("IMAGE_MODEL_NAME").unwrap_or(default.image_model_name),
            edit_model_name: std::env::var("EDIT_MODEL_NAME").unwrap_or(default.edit_model_name),
            default_style: std::env::var("PHOTO_STYLE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_style),
            default_size: std::env::var("IMAGE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_size),
            max_concurrent_generations: std::env::var("MAX_CONCURRENT_GENERATIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_generations),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    ///
    /// 文件中没有 `api_key` 时仍会读取环境变量里的 Key
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;
        if config.api_key.is_empty() {
            config.api_key = Self::from_env().api_key;
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 会话初始的风格配置
    pub fn style_config(&self) -> StyleConfig {
        StyleConfig::new(self.default_style, self.default_size)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_key = "test-key"
            default_style = "social"
            default_size = "4K"
            max_concurrent_generations = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.default_style, PhotoStyle::Social);
        assert_eq!(config.default_size, ImageSize::High);
        assert_eq!(config.max_concurrent_generations, 0);
        assert_eq!(config.text_model_name, "gemini-2.5-flash");
        assert_eq!(config.edit_model_name, "gemini-2.5-flash-image");
    }

    #[test]
    fn test_unknown_style_is_rejected() {
        assert!(Config::from_toml_str(r#"default_style = "neon""#).is_err());
    }

    #[test]
    fn test_blank_key_is_missing() {
        let config = Config {
            api_key: "   ".to_string(),
            ..Default::default()
        };
        assert!(!config.has_api_key());
    }
}
