pub mod node;
pub mod board;
pub mod order;
pub mod project;
pub mod config;

pub use node::*;
pub use board::*;
pub use order::*;
pub use project::*;
pub use config::*;
