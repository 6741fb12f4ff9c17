//! 会话 - 对外接口
//!
//! 展示层只通过 `Session` 交互：解析菜单、单道菜生成 / 重新生成 / 编辑、
//! 批量生成、切换风格与分辨率、重置会话，以及读取当前状态快照。
//! 任何会调用模型的操作之前都要先通过 Key 检查。

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppResult, AuthorizationError, ExtractionError, GuardError};
use crate::infrastructure::{KeyGate, StaticKeyGate};
use crate::models::{Dish, DishId, ImageRef, ImageSize, PhotoStyle, StyleConfig};
use crate::orchestrator::generation::{GenerateAllReport, GenerateMode, GenerationOrchestrator};
use crate::orchestrator::state::{SessionState, SharedState};
use crate::services::ModelGateway;

const EXTRACTION_BANNER: &str = "菜单解析失败，请重试或检查 API Key。";

/// 菜单解析在途标记
///
/// 正常结束时在写回结果的同一把锁内清除；调用方放弃等待时由 `Drop` 清除。
/// 会话已重置时标记属于新的一轮，不做处理
struct ExtractionFlag {
    state: SharedState,
    epoch: u64,
    armed: bool,
}

impl ExtractionFlag {
    fn clear(mut self, state: &mut SessionState) {
        if state.epoch == self.epoch {
            state.extracting = false;
        }
        self.armed = false;
    }
}

impl Drop for ExtractionFlag {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if state.epoch == self.epoch {
            warn!("菜单解析被中途放弃");
            state.extracting = false;
        }
    }
}

pub struct Session {
    gateway: ModelGateway,
    orchestrator: GenerationOrchestrator,
    key_gate: Arc<dyn KeyGate>,
    state: SharedState,
}

impl Session {
    pub fn new(gateway: ModelGateway, key_gate: Arc<dyn KeyGate>, config: &Config) -> Self {
        let state = SharedState::new(config.style_config());
        let orchestrator = GenerationOrchestrator::new(
            gateway.clone(),
            state.clone(),
            config.max_concurrent_generations,
        );
        Self {
            gateway,
            orchestrator,
            key_gate,
            state,
        }
    }

    /// 使用真实模型客户端，Key 是否可用取决于配置
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ModelGateway::from_config(config),
            Arc::new(StaticKeyGate::from_config(config)),
            config,
        )
    }

    // ========== 授权 ==========

    /// 启动时的 Key 检查：未选择时发起一次选择流程，再检查一次
    pub async fn ensure_authorized(&self) -> Result<(), AuthorizationError> {
        if self.key_gate.has_selected_key().await {
            return Ok(());
        }
        info!("🔑 尚未选择 API Key，发起选择...");
        self.key_gate.request_key_selection().await;
        self.authorize().await
    }

    async fn authorize(&self) -> Result<(), AuthorizationError> {
        if self.key_gate.has_selected_key().await {
            Ok(())
        } else {
            warn!("未选择 API Key，拒绝调用模型");
            Err(AuthorizationError::KeyNotSelected)
        }
    }

    // ========== 菜单解析 ==========

    /// 解析菜单并整体替换当前菜品，返回新菜品的 id（按菜单顺序）
    ///
    /// 失败时设置会话提示，注册表保持原样
    pub async fn extract_dishes(&self, menu_text: &str) -> AppResult<Vec<DishId>> {
        if menu_text.trim().is_empty() {
            return Err(ExtractionError::EmptyInput.into());
        }
        self.authorize().await?;

        let flag = {
            let mut state = self.state.lock();
            if state.extracting {
                return Err(GuardError::ExtractionInFlight.into());
            }
            state.extracting = true;
            state.banner = None;
            ExtractionFlag {
                state: self.state.clone(),
                epoch: state.epoch,
                armed: true,
            }
        };
        let epoch = flag.epoch;

        let result = self.gateway.extract(menu_text).await;

        let mut state = self.state.lock();
        flag.clear(&mut state);
        match result {
            Ok(drafts) if state.epoch == epoch => Ok(state.registry.replace_all(drafts)),
            Ok(_) => {
                info!("会话已重置，丢弃本次解析结果");
                Ok(Vec::new())
            }
            Err(e) => {
                if state.epoch == epoch {
                    state.banner = Some(EXTRACTION_BANNER.to_string());
                }
                Err(e.into())
            }
        }
    }

    // ========== 单道菜操作 ==========

    /// 为还没有图片的菜生成图片
    pub async fn request_generation(&self, id: DishId) -> AppResult<ImageRef> {
        self.authorize().await?;
        self.orchestrator
            .request_generation(id, GenerateMode::Missing)
            .await
    }

    /// 重新生成，允许覆盖已有图片
    pub async fn request_regeneration(&self, id: DishId) -> AppResult<ImageRef> {
        self.authorize().await?;
        self.orchestrator
            .request_generation(id, GenerateMode::Regenerate)
            .await
    }

    pub async fn request_edit(&self, id: DishId, instruction: &str) -> AppResult<ImageRef> {
        self.authorize().await?;
        self.orchestrator.request_edit(id, instruction).await
    }

    /// 生成全部缺失图片
    pub async fn request_generate_all(&self) -> AppResult<GenerateAllReport> {
        self.authorize().await?;
        Ok(self.orchestrator.generate_all().await)
    }

    // ========== 风格配置 ==========

    pub fn set_style(&self, style: PhotoStyle) -> Result<(), GuardError> {
        self.orchestrator.set_style(style)
    }

    pub fn set_resolution(&self, size: ImageSize) -> Result<(), GuardError> {
        self.orchestrator.set_resolution(size)
    }

    /// 新菜单：清空菜品与提示；在途请求完成后的结果会被丢弃
    pub fn reset_session(&self) {
        let mut state = self.state.lock();
        state.registry.clear();
        state.banner = None;
        state.extracting = false;
        state.epoch += 1;
        info!("🔄 会话已重置");
    }

    // ========== 只读访问 ==========

    pub fn dishes(&self) -> Vec<Dish> {
        self.state.lock().registry.snapshot()
    }

    pub fn dish(&self, id: DishId) -> Option<Dish> {
        self.state.lock().registry.get(id).cloned()
    }

    pub fn style_config(&self) -> StyleConfig {
        self.state.lock().style
    }

    /// 是否有菜品在生成或编辑（此时风格选择不可用）
    pub fn is_busy(&self) -> bool {
        self.state.lock().registry.any_busy()
    }

    pub fn is_extracting(&self) -> bool {
        self.state.lock().extracting
    }

    /// 是否还有可以批量生成的菜品
    pub fn can_generate_all(&self) -> bool {
        self.state.lock().registry.has_missing_images()
    }

    /// 会话级错误提示
    pub fn banner(&self) -> Option<String> {
        self.state.lock().banner.clone()
    }
}
