pub mod history;
pub mod schedule;

use crate::interface::repository::history::HistoryRepository;
use crate::interface::repository::schedule::ScheduleRepository;

pub trait ScheduleStore: ScheduleRepository + HistoryRepository + Send + Sync {}

impl<T> ScheduleStore for T where T: ScheduleRepository + HistoryRepository + Send + Sync {}
