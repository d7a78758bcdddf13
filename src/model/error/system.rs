use macros::traceable;

traceable! {
    SystemError {
        #[error("Failed to initialize logging")]
        InitializeLoggingFailed => tracing::Level::ERROR,

        #[error("Failed to listen for shutdown signal")]
        SignalListenFailed => tracing::Level::ERROR,

        #[no_source]
        #[error("Shutdown grace period elapsed with {abandoned} backup(s) still running")]
        ShutdownTimedOut { abandoned: usize } => tracing::Level::WARN,

        #[error("Schedule timer stopped unexpectedly")]
        TimerPanicked => tracing::Level::ERROR,
    }
}
