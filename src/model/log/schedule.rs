use chrono::{DateTime, Utc};
use macros::loggable;

loggable! {
    ScheduleLog {
        #[error("Schedule timer started, polling every {seconds}s")]
        TimerStarted { seconds: u64 } => tracing::Level::INFO,

        #[error("Schedule timer stopped")]
        TimerStopped => tracing::Level::INFO,

        #[error("Checking {count} active backup schedule(s)")]
        PollStarted { count: usize } => tracing::Level::DEBUG,

        #[error("Backup due for schedule {name}")]
        Dispatched { name: String } => tracing::Level::INFO,

        #[error("Schedule {name} is still running, skipping this tick")]
        SkippedInFlight { name: String } => tracing::Level::DEBUG,

        #[error("Schedule {name} has expired and was deactivated")]
        ScheduleExpired { name: String } => tracing::Level::INFO,

        #[error("Next backup scheduled for {next}")]
        NextBackupScheduled { next: DateTime<Utc> } => tracing::Level::INFO,

        #[error("Manual backup triggered for {name}")]
        ManualTrigger { name: String } => tracing::Level::INFO,

        #[error("All running backups finished")]
        Drained => tracing::Level::INFO,
    }
}
