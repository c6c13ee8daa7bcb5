pub mod graph;
pub mod items;
pub mod types;

pub use graph::*;
pub use items::*;
pub use types::*;
