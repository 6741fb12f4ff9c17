pub mod dish_registry;

pub use dish_registry::DishRegistry;
