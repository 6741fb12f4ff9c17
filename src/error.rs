use thiserror::Error;

use crate::models::{DishId, GenerationState};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 菜单解析错误
    #[error("菜单解析失败: {0}")]
    Extraction(#[from] ExtractionError),
    /// 图片生成错误
    #[error("图片生成失败: {0}")]
    Generation(#[from] GenerationError),
    /// 图片编辑错误
    #[error("图片编辑失败: {0}")]
    Edit(#[from] EditError),
    /// 授权错误
    #[error("授权错误: {0}")]
    Authorization(#[from] AuthorizationError),
    /// 状态守卫拒绝
    #[error("请求被拒绝: {0}")]
    Guard(#[from] GuardError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 模型 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回非成功状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
}

/// 菜单解析错误
///
/// 任何一种都意味着注册表不会被修改
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("菜单文本为空")]
    EmptyInput,
    #[error("模型返回内容为空")]
    EmptyResponse,
    #[error("模型返回的 JSON 无法解析: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("模型返回内容不符合约定结构: {0}")]
    SchemaViolation(String),
    #[error("未识别到任何菜品")]
    NoDishes,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// 图片生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 响应里没有图片，用户可以重试
    #[error("模型未返回图片")]
    NoImage,
    #[error("生成任务异常退出: {0}")]
    TaskAborted(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// 图片编辑错误
#[derive(Debug, Error)]
pub enum EditError {
    #[error("模型未返回编辑后的图片")]
    NoImage,
    #[error("无法解析原图引用: {0}")]
    InvalidImage(String),
    #[error("编辑任务异常退出: {0}")]
    TaskAborted(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// 授权错误
#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("尚未选择 API Key")]
    KeyNotSelected,
}

/// 状态守卫错误：请求在调用模型之前就被拒绝
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("菜品不存在: {0}")]
    UnknownDish(DishId),
    #[error("菜品 {id} 正在处理中 ({state:?})")]
    Busy { id: DishId, state: GenerationState },
    #[error("菜品 {0} 已有图片，请使用重新生成")]
    ImageAlreadyPresent(DishId),
    #[error("菜品 {0} 还没有图片，无法编辑")]
    NoImageToEdit(DishId),
    #[error("编辑指令为空")]
    EmptyInstruction,
    #[error("仍有菜品在处理中，暂时不能修改风格或分辨率")]
    SessionBusy,
    #[error("菜单正在解析中")]
    ExtractionInFlight,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 未知的枚举取值
    #[error("无法识别的{kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

// ========== 便捷构造函数 ==========

impl ApiError {
    /// 创建API请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
