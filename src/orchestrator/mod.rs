//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `generation` - 生成编排器
//! - 每道菜的状态机（Idle / Generating / Editing）
//! - 单菜品串行守卫：同一道菜不会有两个在途请求
//! - 批量生成：每道菜一个独立任务（tokio::spawn），可选 Semaphore 限流
//! - 风格 / 分辨率修改守卫
//!
//! ### `session` - 会话
//! - 对外暴露的全部操作
//! - Key 检查、菜单解析状态、会话提示、重置
//!
//! ### `state` - 共享状态
//! - 注册表 + 风格配置，放在同一把锁里
//!
//! ## 层次关系
//!
//! ```text
//! session (对外接口 + Key 检查)
//!     ↓
//! generation (状态机 + 并发)
//!     ↓
//! services::ModelGateway (提示词 + 响应解码)
//!     ↓
//! clients (文本 / 图片模型 HTTP 调用)
//! ```

pub mod generation;
pub mod session;
pub mod state;

// 重新导出主要类型
pub use generation::{GenerateAllReport, GenerateMode, GenerationOrchestrator};
pub use session::Session;
pub use state::{SessionState, SharedState};
