//! 会话共享状态
//!
//! 所有状态迁移都在同一把锁内同步完成，锁不会跨越任何网络等待，
//! 因此观察者看到的每次迁移都是原子的。

use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::StyleConfig;
use crate::registry::DishRegistry;

#[derive(Debug, Default)]
pub struct SessionState {
    pub registry: DishRegistry,
    pub style: StyleConfig,
    /// 菜单解析是否在途
    pub extracting: bool,
    /// 面向用户的会话级错误提示
    pub banner: Option<String>,
    /// 每次重置会话递增，用来丢弃重置前发起的解析结果
    pub epoch: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SharedState(Arc<Mutex<SessionState>>);

impl SharedState {
    pub fn new(style: StyleConfig) -> Self {
        Self(Arc::new(Mutex::new(SessionState {
            style,
            ..Default::default()
        })))
    }

    /// 获取锁，锁中毒时直接取回内部数据
    pub fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
