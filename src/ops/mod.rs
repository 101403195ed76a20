pub mod check;
pub mod drag;
pub mod filter;
pub mod flatten;
pub mod gesture;
pub mod reorganize;
pub mod resolve;
pub mod search;
pub mod submit;
pub mod topology;
