pub mod backup_job;
pub mod backup_schedule;
pub mod frequency;
