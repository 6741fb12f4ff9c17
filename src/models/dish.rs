use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::image::ImageRef;

/// 菜品的稳定标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DishId(Uuid);

impl DishId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DishId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DishId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 菜品当前的处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GenerationState {
    #[default]
    Idle,
    Generating,
    Editing,
}

impl GenerationState {
    pub fn is_idle(self) -> bool {
        self == GenerationState::Idle
    }
}

/// 模型从菜单中解析出的菜品（尚未分配 id）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishDraft {
    pub name: String,
    pub description: String,
}

impl DishDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// 菜品记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub state: GenerationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Dish {
    pub fn from_draft(draft: DishDraft) -> Self {
        Self {
            id: DishId::new(),
            name: draft.name,
            description: draft.description,
            image: None,
            state: GenerationState::Idle,
            last_error: None,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// 是否应该被"生成全部缺失图片"选中
    pub fn is_missing_image(&self) -> bool {
        self.state.is_idle() && self.image.is_none()
    }
}

/// 对单个菜品的局部更新，`None` 表示该字段不变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DishPatch {
    pub image: Option<ImageRef>,
    pub state: Option<GenerationState>,
    pub last_error: Option<Option<String>>,
}

impl DishPatch {
    /// 进入某个处理状态，并清掉上一次的错误
    pub fn begin(state: GenerationState) -> Self {
        Self {
            state: Some(state),
            last_error: Some(None),
            ..Default::default()
        }
    }

    /// 成功：写入新图片，回到空闲
    pub fn succeeded(image: ImageRef) -> Self {
        Self {
            image: Some(image),
            state: Some(GenerationState::Idle),
            last_error: Some(None),
        }
    }

    /// 失败：图片不动，记录错误，回到空闲
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            image: None,
            state: Some(GenerationState::Idle),
            last_error: Some(Some(message.into())),
        }
    }

    pub fn apply_to(self, dish: &mut Dish) {
        if let Some(image) = self.image {
            dish.image = Some(image);
        }
        if let Some(state) = self.state {
            dish.state = state;
        }
        if let Some(last_error) = self.last_error {
            dish.last_error = last_error;
        }
    }
}
