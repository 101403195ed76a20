pub mod board_io;
pub mod config_io;
pub mod lock;
pub mod order_store;
pub mod recovery;
pub mod state;
