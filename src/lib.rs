//! # Menu Photographer
//!
//! 把一段菜单文本变成每道菜一张专业美食照片
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只负责和外部模型服务通信
//! - `LlmClient` - 结构化文本输出（菜单解析）
//! - `ImageClient` - 图片生成 / 编辑
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不持有会话状态
//! - `ModelGateway` - 解析菜单、生成图片、编辑图片
//!
//! ### ③ 状态层（Registry）
//! - `registry/` - 会话内的菜品集合，保持菜单顺序
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/generation` - 每道菜的状态机和批量生成
//! - `orchestrator/session` - 对外接口、Key 检查、会话重置
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod registry;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{KeyGate, StaticKeyGate};
pub use models::{
    Dish, DishDraft, DishId, GenerationState, ImageRef, ImageSize, PhotoStyle, StyleConfig,
};
pub use orchestrator::{GenerateAllReport, GenerationOrchestrator, Session};
pub use registry::DishRegistry;
pub use services::ModelGateway;
