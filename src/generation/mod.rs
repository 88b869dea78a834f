//! # Itinerary Generation
//!
//! Drives one create-itinerary request from submission to a navigable result.
//!
//! Two timelines run side by side on the current task:
//!
//! - **Request**: the call to the itinerary service, raced against a fixed
//!   timeout (60 seconds by default). Whichever settles first decides the
//!   outcome; the other side is dropped on the spot.
//! - **Progress**: a fixed-interval ticker that eases a percentage toward a
//!   ceiling below 100. The service exposes no real progress, so this is only
//!   feedback for the user. The ticker lives inside the race loop and is gone
//!   as soon as the request timeline settles.
//!
//! On success the status jumps to `Completed` (100%) and the controller waits a
//! short settle delay before handing the route back, so a progress bar can show
//! completion. Failures are reported as [`GenerationResult::Failure`], never as
//! errors; only local validation is an `Err`.
//!
//! Each controller owns its status channel and in-flight flag, so independent
//! controllers never observe each other.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, error::Elapsed};
use tracing::{info, warn};

use crate::error::{FailureReason, ServiceError, ValidationError};
use crate::models::{CreatedItinerary, GenerationRequest, GenerationResult, ItineraryRoute};
use crate::traits::ItineraryService;

/// Timing of the generation lifecycle
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Upper bound on the create-itinerary call
    pub timeout: Duration,
    /// Interval between progress ticks
    pub tick_interval: Duration,
    /// Highest percentage reachable before the result arrives
    pub progress_ceiling: u8,
    /// Fraction of the remaining distance to the ceiling covered per tick
    pub progress_rate: f64,
    /// Pause at 100% before the result is surfaced
    pub settle_delay: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            tick_interval: Duration::from_millis(250),
            progress_ceiling: 99,
            progress_rate: 0.03,
            settle_delay: Duration::from_millis(500),
        }
    }
}

impl GenerationConfig {
    /// Defaults, with the timeout overridable through `GENERATION_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("GENERATION_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!("Ignoring invalid GENERATION_TIMEOUT_SECS value: {}", raw),
            }
        }

        config
    }
}

/// What a progress display should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    Idle,
    InFlight { percent: u8 },
    Completed,
    Failed { reason: FailureReason, percent: u8 },
}

impl GenerationStatus {
    pub const fn percent(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::InFlight { percent } | Self::Failed { percent, .. } => percent,
            Self::Completed => 100,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }
}

/// Runs itinerary generation against an [`ItineraryService`]
pub struct GenerationController {
    service: Arc<dyn ItineraryService>,
    config: GenerationConfig,
    status: watch::Sender<GenerationStatus>,
    in_flight: AtomicBool,
}

impl GenerationController {
    pub fn new(service: Arc<dyn ItineraryService>, config: GenerationConfig) -> Self {
        let (status, _) = watch::channel(GenerationStatus::Idle);

        Self {
            service,
            config,
            status,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Receive status updates. Values may be coalesced, never reordered.
    pub fn subscribe(&self) -> watch::Receiver<GenerationStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> GenerationStatus {
        *self.status.borrow()
    }

    /// Generate an itinerary for `request`.
    ///
    /// Returns `Err` only when the request cannot be submitted at all: it fails
    /// validation, or this controller already has a request in flight. Every
    /// submitted request resolves to exactly one [`GenerationResult`].
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ValidationError> {
        request.validate()?;
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        info!(
            "Generating a {}-day itinerary for {} ({})",
            request.duration_days,
            request.destination,
            request.interests.join(", ")
        );
        self.status.send_replace(GenerationStatus::InFlight { percent: 0 });

        let result = match self.race(request).await {
            Ok(Ok(created)) => GenerationResult::Success(ItineraryRoute::from(created)),
            Ok(Err(e)) => {
                let reason = FailureReason::from(&e);
                warn!("Itinerary generation failed ({}): {}", reason.as_str(), e);
                GenerationResult::Failure(reason)
            }
            Err(_) => {
                warn!(
                    "Itinerary generation timed out after {}s",
                    self.config.timeout.as_secs()
                );
                GenerationResult::Failure(FailureReason::Timeout)
            }
        };

        match &result {
            GenerationResult::Success(route) => {
                self.status.send_replace(GenerationStatus::Completed);
                tokio::time::sleep(self.config.settle_delay).await;
                info!("Itinerary ready at {}", route);
            }
            GenerationResult::Failure(reason) => {
                let percent = self.status().percent();
                self.status.send_replace(GenerationStatus::Failed {
                    reason: *reason,
                    percent,
                });
            }
        }

        Ok(result)
    }

    /// Race the service call against the timeout, ticking progress meanwhile.
    async fn race(
        &self,
        request: &GenerationRequest,
    ) -> Result<Result<CreatedItinerary, ServiceError>, Elapsed> {
        let request_timeline =
            tokio::time::timeout(self.config.timeout, self.service.create_itinerary(request));
        tokio::pin!(request_timeline);

        let period = self.config.tick_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let ceiling = f64::from(self.config.progress_ceiling);
        let mut progress = 0.0_f64;

        let outcome = loop {
            tokio::select! {
                biased;
                outcome = &mut request_timeline => break outcome,
                _ = ticker.tick() => {
                    progress += (ceiling - progress) * self.config.progress_rate;
                    self.publish_progress(progress.floor() as u8);
                }
            }
        };

        // The ticker must not outlive the request timeline.
        drop(ticker);
        outcome
    }

    fn publish_progress(&self, percent: u8) {
        let percent = percent.min(self.config.progress_ceiling);
        self.status.send_if_modified(|status| match status {
            GenerationStatus::InFlight { percent: current } if percent > *current => {
                *current = percent;
                true
            }
            _ => false,
        });
    }
}

/// Holds the in-flight flag for the lifetime of one submission.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ValidationError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| ValidationError::AlreadyInFlight)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
