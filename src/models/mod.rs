pub mod dish;
pub mod image;
pub mod style;

pub use dish::{Dish, DishDraft, DishId, DishPatch, GenerationState};
pub use image::{ImagePayload, ImageRef};
pub use style::{AspectRatio, ImageSize, PhotoStyle, StyleConfig};
