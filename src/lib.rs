pub mod core;
pub mod interface;
pub mod model;
