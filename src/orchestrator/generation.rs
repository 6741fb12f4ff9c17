//! 生成编排器 - 编排层
//!
//! ## 职责
//!
//! 驱动每道菜的生成 / 编辑生命周期：
//!
//! ```text
//! Idle --生成请求--> Generating --成功/失败--> Idle
//! Idle --编辑请求--> Editing    --成功/失败--> Idle
//! ```
//!
//! - 同一道菜同一时间最多只有一个在途请求，重复请求由守卫直接拒绝
//! - 失败时图片保持原样，只记录错误
//! - "生成全部缺失图片"为每道菜派生一个独立任务，互不影响
//! - 有菜品在处理中时不允许修改风格或分辨率

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, EditError, GenerationError, GuardError};
use crate::models::{
    Dish, DishId, DishPatch, GenerationState, ImageRef, ImageSize, PhotoStyle, StyleConfig,
};
use crate::orchestrator::state::SharedState;
use crate::services::ModelGateway;
use crate::utils::logging::{log_generate_all_complete, log_generate_all_start, truncate_text};

/// 生成请求的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateMode {
    /// 只给还没有图片的菜生成
    Missing,
    /// 重新生成，允许覆盖已有图片
    Regenerate,
}

/// 已通过守卫、进入 Generating 状态的请求
///
/// 菜名、描述和风格在发起时按值拷贝
#[derive(Debug, Clone)]
struct GenerationTicket {
    id: DishId,
    name: String,
    description: String,
    style: StyleConfig,
}

/// 已通过守卫、进入 Editing 状态的请求
#[derive(Debug, Clone)]
struct EditTicket {
    id: DishId,
    name: String,
    image: ImageRef,
    instruction: String,
}

/// 批量生成结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateAllReport {
    /// 实际发起的生成请求数
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 因已有图片或正在处理而跳过的菜品数
    pub skipped: usize,
    /// 失败的菜品及原因
    pub failures: Vec<(DishId, String)>,
}

/// 生成编排器
#[derive(Clone)]
pub struct GenerationOrchestrator {
    gateway: ModelGateway,
    state: SharedState,
    limiter: Option<Arc<Semaphore>>,
}

impl GenerationOrchestrator {
    /// `max_concurrent` 为 0 时不限制同时在途的模型请求数
    pub fn new(gateway: ModelGateway, state: SharedState, max_concurrent: usize) -> Self {
        let limiter = (max_concurrent > 0).then(|| Arc::new(Semaphore::new(max_concurrent)));
        Self {
            gateway,
            state,
            limiter,
        }
    }

    // ========== 生成 ==========

    /// 为一道菜生成图片
    ///
    /// 守卫拒绝时不会调用模型；模型失败时错误已记录在菜品上，同时返回给调用方
    ///
    /// 模型调用在独立任务中执行，调用方放弃等待时菜品仍会回到 Idle
    pub async fn request_generation(
        &self,
        id: DishId,
        mode: GenerateMode,
    ) -> Result<ImageRef, AppError> {
        let ticket = self.begin_generation(id, mode)?;
        let handle = self.spawn_generation(ticket);
        Ok(self.settle_generation(id, handle.await)?)
    }

    /// 为所有空闲且没有图片的菜品生成图片
    ///
    /// 选择和状态迁移在一次加锁内完成，之后每道菜一个独立任务，
    /// 谁先完成谁先写回注册表；某道菜失败不影响其他菜
    pub async fn generate_all(&self) -> GenerateAllReport {
        let (tickets, skipped) = {
            let mut state = self.state.lock();
            let style = state.style;
            let mut tickets = Vec::new();
            let mut skipped = 0;

            let candidates: Vec<Dish> = state.registry.snapshot();
            for dish in candidates {
                if !dish.is_missing_image() {
                    skipped += 1;
                    continue;
                }
                state
                    .registry
                    .patch(dish.id, DishPatch::begin(GenerationState::Generating));
                tickets.push(GenerationTicket {
                    id: dish.id,
                    name: dish.name,
                    description: dish.description,
                    style,
                });
            }
            (tickets, skipped)
        };

        let mut report = GenerateAllReport {
            requested: tickets.len(),
            skipped,
            ..Default::default()
        };

        if tickets.is_empty() {
            info!("没有需要生成图片的菜品 (跳过 {} 道)", skipped);
            return report;
        }

        log_generate_all_start(report.requested, skipped);

        let ids: Vec<DishId> = tickets.iter().map(|t| t.id).collect();
        let handles: Vec<_> = tickets
            .into_iter()
            .map(|ticket| self.spawn_generation(ticket))
            .collect();

        for (id, joined) in ids.into_iter().zip(join_all(handles).await) {
            match self.settle_generation(id, joined) {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    report.failures.push((id, e.to_string()));
                }
            }
        }

        log_generate_all_complete(&report);
        report
    }

    fn begin_generation(
        &self,
        id: DishId,
        mode: GenerateMode,
    ) -> Result<GenerationTicket, GuardError> {
        let mut state = self.state.lock();
        let style = state.style;
        let dish = state.registry.get(id).ok_or(GuardError::UnknownDish(id))?;

        if !dish.state.is_idle() {
            return Err(GuardError::Busy {
                id,
                state: dish.state,
            });
        }
        if mode == GenerateMode::Missing && dish.has_image() {
            return Err(GuardError::ImageAlreadyPresent(id));
        }

        let ticket = GenerationTicket {
            id,
            name: dish.name.clone(),
            description: dish.description.clone(),
            style,
        };
        state
            .registry
            .patch(id, DishPatch::begin(GenerationState::Generating));

        debug!("[菜品 {}] Idle -> Generating ({:?})", id, mode);
        Ok(ticket)
    }

    fn spawn_generation(
        &self,
        ticket: GenerationTicket,
    ) -> JoinHandle<Result<ImageRef, GenerationError>> {
        let this = self.clone();
        tokio::spawn(async move { this.run_generation(ticket).await })
    }

    /// 任务本身异常退出时，菜品不能停留在 Generating
    fn settle_generation(
        &self,
        id: DishId,
        joined: Result<Result<ImageRef, GenerationError>, JoinError>,
    ) -> Result<ImageRef, GenerationError> {
        joined.unwrap_or_else(|e| {
            error!("[菜品 {}] 生成任务异常退出: {}", id, e);
            let err = GenerationError::TaskAborted(e.to_string());
            self.finish(id, DishPatch::failed(err.to_string()));
            Err(err)
        })
    }

    async fn run_generation(&self, ticket: GenerationTicket) -> Result<ImageRef, GenerationError> {
        let _permit = self.acquire_permit().await;

        info!(
            "[{}] 🎨 正在生成图片 (风格: {}, 分辨率: {})...",
            ticket.name, ticket.style.style, ticket.style.size
        );

        let result = self
            .gateway
            .synthesize(&ticket.name, &ticket.description, ticket.style)
            .await;

        match &result {
            Ok(image) => {
                info!("[{}] ✓ 图片生成完成", ticket.name);
                self.finish(ticket.id, DishPatch::succeeded(image.clone()));
            }
            Err(e) => {
                warn!("[{}] ❌ 图片生成失败: {}", ticket.name, e);
                self.finish(ticket.id, DishPatch::failed(e.to_string()));
            }
        }

        result
    }

    // ========== 编辑 ==========

    /// 按指令编辑一道菜的现有图片
    ///
    /// 成功才会替换图片；失败时图片保持编辑前的样子
    pub async fn request_edit(&self, id: DishId, instruction: &str) -> Result<ImageRef, AppError> {
        let ticket = self.begin_edit(id, instruction)?;
        let this = self.clone();
        let joined = tokio::spawn(async move { this.run_edit(ticket).await }).await;

        Ok(joined.unwrap_or_else(|e| {
            error!("[菜品 {}] 编辑任务异常退出: {}", id, e);
            let err = EditError::TaskAborted(e.to_string());
            self.finish(id, DishPatch::failed(err.to_string()));
            Err(err)
        })?)
    }

    fn begin_edit(&self, id: DishId, instruction: &str) -> Result<EditTicket, GuardError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(GuardError::EmptyInstruction);
        }

        let mut state = self.state.lock();
        let dish = state.registry.get(id).ok_or(GuardError::UnknownDish(id))?;

        if !dish.state.is_idle() {
            return Err(GuardError::Busy {
                id,
                state: dish.state,
            });
        }
        let image = dish.image.clone().ok_or(GuardError::NoImageToEdit(id))?;

        let ticket = EditTicket {
            id,
            name: dish.name.clone(),
            image,
            instruction: instruction.to_string(),
        };
        state
            .registry
            .patch(id, DishPatch::begin(GenerationState::Editing));

        debug!("[菜品 {}] Idle -> Editing", id);
        Ok(ticket)
    }

    async fn run_edit(&self, ticket: EditTicket) -> Result<ImageRef, EditError> {
        let _permit = self.acquire_permit().await;

        info!(
            "[{}] ✏️ 正在编辑图片: {}",
            ticket.name,
            truncate_text(&ticket.instruction, 60)
        );

        let result = self.gateway.edit(&ticket.image, &ticket.instruction).await;

        match &result {
            Ok(image) => {
                info!("[{}] ✓ 图片编辑完成", ticket.name);
                self.finish(ticket.id, DishPatch::succeeded(image.clone()));
            }
            Err(e) => {
                warn!("[{}] ❌ 图片编辑失败，保留原图: {}", ticket.name, e);
                self.finish(ticket.id, DishPatch::failed(e.to_string()));
            }
        }

        result
    }

    // ========== 风格配置 ==========

    /// 修改摄影风格；有菜品在处理中时拒绝
    pub fn set_style(&self, style: PhotoStyle) -> Result<(), GuardError> {
        let mut state = self.state.lock();
        if state.registry.any_busy() {
            return Err(GuardError::SessionBusy);
        }
        state.style.style = style;
        info!("摄影风格已切换为: {}", style);
        Ok(())
    }

    /// 修改分辨率；有菜品在处理中时拒绝
    pub fn set_resolution(&self, size: ImageSize) -> Result<(), GuardError> {
        let mut state = self.state.lock();
        if state.registry.any_busy() {
            return Err(GuardError::SessionBusy);
        }
        state.style.size = size;
        info!("分辨率已切换为: {}", size);
        Ok(())
    }

    // ========== 辅助方法 ==========

    /// 写回结果；会话已被重置时 id 不存在，结果直接丢弃
    fn finish(&self, id: DishId, patch: DishPatch) {
        if !self.state.lock().registry.patch(id, patch) {
            debug!("[菜品 {}] 会话已重置，丢弃结果", id);
        }
    }

    async fn acquire_permit(&self) -> Option<tokio::sync::SemaphorePermit<'_>> {
        match &self.limiter {
            Some(limiter) => limiter.acquire().await.ok(),
            None => None,
        }
    }
}
