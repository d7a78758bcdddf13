pub mod dispatcher;
pub mod due_date;
pub mod schedule_timer;
