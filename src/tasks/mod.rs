pub mod model;
pub mod store;

pub use model::{Priority, TodoDocument, TodoStats, TodoTask};
pub use store::TodoList;
