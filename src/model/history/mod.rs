pub mod backup_history;
pub mod outcome;
