use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 摄影风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoStyle {
    /// 明亮现代
    #[default]
    Bright,
    /// 乡村暗调
    Rustic,
    /// 社交媒体俯拍
    Social,
}

impl PhotoStyle {
    pub const ALL: [PhotoStyle; 3] = [PhotoStyle::Bright, PhotoStyle::Rustic, PhotoStyle::Social];

    /// 展示名称
    pub fn label(self) -> &'static str {
        match self {
            PhotoStyle::Bright => "Bright & Modern",
            PhotoStyle::Rustic => "Rustic & Dark",
            PhotoStyle::Social => "Social Media",
        }
    }

    /// 简短说明
    pub fn summary(self) -> &'static str {
        match self {
            PhotoStyle::Bright => "High-key, clean, sharp focus",
            PhotoStyle::Rustic => "Moody, textured, warm tones",
            PhotoStyle::Social => "Top-down, trendy, vibrant",
        }
    }

    /// 该风格请求的画面比例
    pub fn aspect_ratio(self) -> AspectRatio {
        match self {
            PhotoStyle::Social => AspectRatio::Portrait,
            PhotoStyle::Bright | PhotoStyle::Rustic => AspectRatio::Landscape,
        }
    }
}

impl FromStr for PhotoStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bright" | "modern" | "bright/modern" => Ok(PhotoStyle::Bright),
            "rustic" | "dark" | "rustic/dark" => Ok(PhotoStyle::Rustic),
            "social" | "social media" | "top-down" => Ok(PhotoStyle::Social),
            _ => Err(ConfigError::UnknownVariant {
                kind: "摄影风格",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PhotoStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 输出分辨率档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    Low,
    #[serde(rename = "2K")]
    Medium,
    #[serde(rename = "4K")]
    High,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::Low, ImageSize::Medium, ImageSize::High];

    /// 请求中使用的尺寸档位
    pub fn tier(self) -> &'static str {
        match self {
            ImageSize::Low => "1K",
            ImageSize::Medium => "2K",
            ImageSize::High => "4K",
        }
    }
}

impl FromStr for ImageSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1K" | "LOW" => Ok(ImageSize::Low),
            "2K" | "MEDIUM" => Ok(ImageSize::Medium),
            "4K" | "HIGH" => Ok(ImageSize::High),
            _ => Err(ConfigError::UnknownVariant {
                kind: "分辨率",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tier())
    }
}

/// 画面比例
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// 4:3，默认比例
    Landscape,
    /// 4:5，偏竖构图
    Portrait,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Landscape => "4:3",
            AspectRatio::Portrait => "4:5",
        }
    }
}

/// 全局风格配置
///
/// 每次发起生成请求时按值拷贝，之后的修改不会影响已经在途的请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    pub style: PhotoStyle,
    pub size: ImageSize,
}

impl StyleConfig {
    pub fn new(style: PhotoStyle, size: ImageSize) -> Self {
        Self { style, size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_is_portrait() {
        assert_eq!(PhotoStyle::Social.aspect_ratio().as_str(), "4:5");
        assert_eq!(PhotoStyle::Bright.aspect_ratio().as_str(), "4:3");
        assert_eq!(PhotoStyle::Rustic.aspect_ratio().as_str(), "4:3");
    }

    #[test]
    fn test_parse_style_and_size() {
        assert_eq!("Rustic".parse::<PhotoStyle>().unwrap(), PhotoStyle::Rustic);
        assert_eq!(" social ".parse::<PhotoStyle>().unwrap(), PhotoStyle::Social);
        assert!("neon".parse::<PhotoStyle>().is_err());

        assert_eq!("2k".parse::<ImageSize>().unwrap(), ImageSize::Medium);
        assert_eq!("HIGH".parse::<ImageSize>().unwrap(), ImageSize::High);
        assert!("8K".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = StyleConfig::default();
        assert_eq!(config.style, PhotoStyle::Bright);
        assert_eq!(config.size.tier(), "1K");
    }
}
