use crate::core::backup::pipeline::BackupPipeline;
use crate::interface::repository::ScheduleStore;
use crate::interface::repository::schedule::ScheduleRepository;
use crate::model::artifact::Artifact;
use crate::model::config::Config;
use crate::model::error::Error;
use crate::model::error::system::SystemError;
use crate::model::error::task::TaskError;
use crate::model::log::schedule::ScheduleLog;
use crate::model::schedule::backup_job::{BackupJob, RunTrigger};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use macros::log;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

/// Marks a schedule as running for as long as it is alive.
struct InFlightClaim {
    in_flight: Arc<DashMap<Uuid, DateTime<Utc>>>,
    schedule_id: Uuid,
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.in_flight.remove(&self.schedule_id);
    }
}

/// Finds due schedules and runs them on a bounded worker pool, at most one
/// run per schedule at a time.
pub struct Dispatcher {
    repository: Arc<dyn ScheduleStore>,
    pipeline: Arc<BackupPipeline>,
    in_flight: Arc<DashMap<Uuid, DateTime<Utc>>>,
    worker_pool: Arc<Semaphore>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    expire_schedules: bool,
    grace_period: Duration,
}

impl Dispatcher {
    pub fn new(
        repository: Arc<dyn ScheduleStore>,
        pipeline: Arc<BackupPipeline>,
        config: &Config,
    ) -> Self {
        Self {
            repository,
            pipeline,
            in_flight: Arc::new(DashMap::new()),
            worker_pool: Arc::new(Semaphore::new(usize::from(config.max_concurrency.max(1)))),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            expire_schedules: config.expire_schedules,
            grace_period: Duration::from_secs(config.shutdown_grace_period),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_in_flight(&self, schedule_id: Uuid) -> bool {
        self.in_flight.contains_key(&schedule_id)
    }

    fn claim(&self, schedule_id: Uuid) -> Option<InFlightClaim> {
        match self.in_flight.entry(schedule_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(entry) => {
                entry.insert(Utc::now());
                Some(InFlightClaim {
                    in_flight: self.in_flight.clone(),
                    schedule_id,
                })
            }
        }
    }

    /// One scan of the store. Dispatches every eligible schedule that is not
    /// already running and returns the ids dispatched.
    pub async fn poll_once(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, Error> {
        if self.cancel.is_cancelled() {
            return Ok(Vec::new());
        }
        let schedules = self.repository.list_active().await?;
        log!(ScheduleLog::PollStarted {
            count: schedules.len()
        });

        let mut dispatched = Vec::new();
        for schedule in schedules {
            if self.expire_schedules && schedule.is_expired(now) {
                match self.repository.set_active(schedule.id, false).await {
                    Ok(()) => log!(ScheduleLog::ScheduleExpired {
                        name: schedule.name.clone()
                    }, schedule_id = schedule.id),
                    Err(err) => err.log(),
                }
                continue;
            }
            if !schedule.is_eligible(now) {
                continue;
            }
            let Some(claim) = self.claim(schedule.id) else {
                log!(ScheduleLog::SkippedInFlight {
                    name: schedule.name.clone()
                }, schedule_id = schedule.id);
                continue;
            };
            log!(ScheduleLog::Dispatched {
                name: schedule.name.clone()
            }, schedule_id = schedule.id);
            self.spawn_scheduled(schedule.to_job(now, RunTrigger::Scheduled), claim);
            dispatched.push(schedule.id);
        }
        Ok(dispatched)
    }

    fn spawn_scheduled(&self, job: BackupJob, claim: InFlightClaim) {
        let pipeline = self.pipeline.clone();
        let worker_pool = self.worker_pool.clone();
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            let _claim = claim;
            // Runs still queued for a worker at shutdown are dropped; their
            // schedule stays due and is picked up after restart.
            let permit = select! {
                biased;
                _ = cancel.cancelled() => return,
                permit = worker_pool.acquire_owned() => permit,
            };
            let Ok(_permit) = permit else {
                log!(TaskError::WorkerPoolClosed);
                return;
            };
            // Failures are logged and recorded by the pipeline.
            let _ = pipeline.run(job).await;
        });
    }

    /// Runs a schedule immediately through the same pipeline and waits for
    /// the result. Fails with `Busy` while the schedule is already running.
    pub async fn trigger_now(&self, schedule_id: Uuid) -> Result<Artifact, Error> {
        if self.cancel.is_cancelled() {
            Err(TaskError::ShuttingDown)?
        }
        let schedule = self
            .repository
            .get_schedule(schedule_id)
            .await?
            .ok_or(TaskError::schedule_not_found(schedule_id))?;
        let claim = self
            .claim(schedule_id)
            .ok_or(TaskError::busy(schedule_id))?;
        log!(ScheduleLog::ManualTrigger {
            name: schedule.name.clone()
        }, schedule_id = schedule_id);

        let job = schedule.to_job(Utc::now(), RunTrigger::Manual);
        let pipeline = self.pipeline.clone();
        let worker_pool = self.worker_pool.clone();
        let handle = self.tracker.spawn(async move {
            let _claim = claim;
            match worker_pool.acquire_owned().await {
                Ok(_permit) => pipeline.run(job).await,
                Err(_) => Err(Error::from(TaskError::WorkerPoolClosed)),
            }
        });
        handle.await.map_err(TaskError::task_panicked)?
    }

    /// Stops dispatching and waits up to the grace period for running
    /// backups to finish.
    pub async fn shutdown(&self) -> Result<(), Error> {
        self.cancel.cancel();
        self.tracker.close();
        match timeout(self.grace_period, self.tracker.wait()).await {
            Ok(()) => {
                log!(ScheduleLog::Drained);
                Ok(())
            }
            Err(_) => Err(SystemError::shutdown_timed_out(self.in_flight.len()).into()),
        }
    }
}
