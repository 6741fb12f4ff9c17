//! 菜品注册表
//!
//! 会话内唯一的菜品集合。插入顺序即展示顺序，更新不会改变顺序；
//! 只能整体替换或清空，不能单独删除某道菜。

use tracing::debug;

use crate::models::{Dish, DishDraft, DishId, DishPatch};

#[derive(Debug, Default, Clone)]
pub struct DishRegistry {
    dishes: Vec<Dish>,
}

impl DishRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用新解析出的菜品整体替换，每道菜分配新的 id
    ///
    /// 旧 id 全部失效，之后针对它们的 `patch` 都会被忽略
    pub fn replace_all(&mut self, drafts: impl IntoIterator<Item = DishDraft>) -> Vec<DishId> {
        self.dishes = drafts.into_iter().map(Dish::from_draft).collect();
        debug!("注册表已替换，共 {} 道菜品", self.dishes.len());
        self.dishes.iter().map(|d| d.id).collect()
    }

    /// 局部更新；id 不存在时什么也不做，返回 `false`
    pub fn patch(&mut self, id: DishId, patch: DishPatch) -> bool {
        match self.dishes.iter_mut().find(|d| d.id == id) {
            Some(dish) => {
                patch.apply_to(dish);
                true
            }
            None => {
                debug!("忽略对已失效菜品 {} 的更新", id);
                false
            }
        }
    }

    pub fn get(&self, id: DishId) -> Option<&Dish> {
        self.dishes.iter().find(|d| d.id == id)
    }

    pub fn all(&self) -> &[Dish] {
        &self.dishes
    }

    /// 只读快照，供轮询 / 展示层使用
    pub fn snapshot(&self) -> Vec<Dish> {
        self.dishes.clone()
    }

    pub fn clear(&mut self) {
        self.dishes.clear();
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }

    /// 是否有菜品正在生成或编辑
    pub fn any_busy(&self) -> bool {
        self.dishes.iter().any(|d| !d.state.is_idle())
    }

    /// 是否还有空闲且没有图片的菜品
    pub fn has_missing_images(&self) -> bool {
        self.dishes.iter().any(Dish::is_missing_image)
    }
}
