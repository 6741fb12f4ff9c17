//! Key 检查 - 基础设施层
//!
//! 模型调用之前的授权关卡，只暴露"是否已选择 Key"和"发起选择"两个能力

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::warn;

use crate::config::Config;

#[async_trait]
pub trait KeyGate: Send + Sync {
    async fn has_selected_key(&self) -> bool;

    /// 发起 Key 选择流程，结果通过下一次 `has_selected_key` 体现
    async fn request_key_selection(&self);
}

/// 由配置决定的 Key 检查
///
/// 命令行环境下没有交互式选择，只能提示用户设置环境变量
pub struct StaticKeyGate {
    selected: AtomicBool,
}

impl StaticKeyGate {
    pub fn new(selected: bool) -> Self {
        Self {
            selected: AtomicBool::new(selected),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.has_api_key())
    }

    pub fn set_selected(&self, selected: bool) {
        self.selected.store(selected, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyGate for StaticKeyGate {
    async fn has_selected_key(&self) -> bool {
        self.selected.load(Ordering::SeqCst)
    }

    async fn request_key_selection(&self) {
        if !self.selected.load(Ordering::SeqCst) {
            warn!("⚠️ 请设置环境变量 GEMINI_API_KEY（或在配置文件中填写 api_key）后重新运行");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_follows_config() {
        let with_key = Config {
            api_key: "k".to_string(),
            ..Default::default()
        };
        assert!(StaticKeyGate::from_config(&with_key).has_selected_key().await);
        assert!(!StaticKeyGate::from_config(&Config::default()).has_selected_key().await);
    }

    #[tokio::test]
    async fn test_request_does_not_grant() {
        let gate = StaticKeyGate::new(false);
        gate.request_key_selection().await;
        assert!(!gate.has_selected_key().await);

        gate.set_selected(true);
        assert!(gate.has_selected_key().await);
    }
}
