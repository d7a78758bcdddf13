use macros::traceable;
use uuid::Uuid;

traceable! {
    TaskError {
        #[no_source]
        #[error("A backup for schedule {schedule_id} is already running")]
        Busy { schedule_id: Uuid } => tracing::Level::WARN,

        #[no_source]
        #[error("Schedule not found: {schedule_id}")]
        ScheduleNotFound { schedule_id: Uuid } => tracing::Level::WARN,

        #[no_source]
        #[error("Dispatcher is shutting down")]
        ShuttingDown => tracing::Level::WARN,

        #[no_source]
        #[error("Worker pool has been closed")]
        WorkerPoolClosed => tracing::Level::ERROR,

        #[error("Backup task panicked")]
        TaskPanicked => tracing::Level::ERROR,
    }
}
