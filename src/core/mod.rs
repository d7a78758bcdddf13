pub mod backup;
pub mod infrastructure;
pub mod schedule;
pub mod system;
