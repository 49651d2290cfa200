//! Bounded concurrent link validation with early exit.
//!
//! [`validate_candidates`] probes a batch of candidates with at most
//! `min(workers, candidates, VALIDATION_HARD_CAP)` probes in flight and stops
//! as soon as `target` links are confirmed valid or the batch deadline
//! passes. Probes still in flight at that point are dropped and their results
//! are never observed.
//!
//! Probe calls are started one per completed probe, and none after the target
//! is met, so a batch never issues more than `target + ceiling - 1` probes.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::time::{sleep_until, Instant};

use crate::channel::Channel;
use crate::config::{SearchConfig, VALIDATION_HARD_CAP};
use crate::error_handling::{ErrorType, InfoType, WarningType};
use crate::searcher::{SearchContext, Searcher};

/// How a validation batch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    /// The target number of valid links was reached.
    Satisfied,
    /// The deadline passed first.
    TimedOut,
    /// Every candidate was probed without reaching the target.
    Exhausted,
}

/// Whether a batch met its target, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    Met,
    Short { found: usize, target: usize },
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetStatus::Met => f.write_str("met"),
            TargetStatus::Short { found, target } => write!(f, "short({}/{})", found, target),
        }
    }
}

/// Settings of one validation batch.
#[derive(Debug, Clone)]
pub struct ValidationSettings {
    pub enabled: bool,
    pub workers: usize,
    pub deadline: Duration,
}

impl From<&SearchConfig> for ValidationSettings {
    fn from(config: &SearchConfig) -> Self {
        ValidationSettings {
            enabled: config.enable_validation,
            workers: config.concurrent_workers,
            deadline: config.validation_deadline,
        }
    }
}

/// Result of one validation batch.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// Confirmed-valid candidates, in input order.
    pub valid: Vec<Channel>,
    pub state: ValidationState,
    /// Number of probes started.
    pub probed: usize,
    pub target: usize,
}

impl ValidationOutcome {
    pub fn status(&self) -> TargetStatus {
        if self.valid.len() >= self.target {
            TargetStatus::Met
        } else {
            TargetStatus::Short {
                found: self.valid.len(),
                target: self.target,
            }
        }
    }
}

/// Concurrent probes allowed for a batch of `candidates`.
pub fn concurrency_ceiling(workers: usize, candidates: usize) -> usize {
    workers.max(1).min(candidates).min(VALIDATION_HARD_CAP)
}

/// Probes `candidates` until `target` of them are valid.
///
/// With validation disabled, returns the first `target` candidates unprobed.
/// Probe panics are caught and counted as invalid.
pub async fn validate_candidates(
    site: &dyn Searcher,
    candidates: Vec<Channel>,
    target: usize,
    settings: &ValidationSettings,
    ctx: &SearchContext,
) -> ValidationOutcome {
    if !settings.enabled || target == 0 || candidates.is_empty() {
        let valid: Vec<Channel> = candidates.into_iter().take(target).collect();
        let state = if valid.len() >= target {
            ValidationState::Satisfied
        } else {
            ValidationState::Exhausted
        };
        return ValidationOutcome {
            valid,
            state,
            probed: 0,
            target,
        };
    }

    let total = candidates.len();
    let ceiling = concurrency_ceiling(settings.workers, total);
    log::info!(
        "[{}] Validating {} links with {} workers (target: {} valid)",
        site.site_name(),
        total,
        ceiling,
        target
    );

    let probe = |index: usize, channel: Channel| async move {
        let valid = match ctx.budget.acquire().await {
            Ok(_permit) => match AssertUnwindSafe(site.validate_link(&channel))
                .catch_unwind()
                .await
            {
                Ok(valid) => valid,
                Err(_) => {
                    log::warn!("[{}] Probe panicked for {}", site.site_name(), channel.url());
                    ctx.stats.increment_error(ErrorType::ProbePanicked);
                    false
                }
            },
            Err(_) => false,
        };
        (index, channel, valid)
    };

    let mut pending = candidates.into_iter().enumerate();
    let mut in_flight = FuturesUnordered::new();
    let mut probed = 0usize;
    for (index, channel) in pending.by_ref().take(ceiling) {
        in_flight.push(probe(index, channel));
        probed += 1;
    }

    let deadline = sleep_until(Instant::now() + settings.deadline);
    tokio::pin!(deadline);

    let mut valid: Vec<(usize, Channel)> = Vec::with_capacity(target);
    let mut completed = 0usize;
    let state = loop {
        if valid.len() >= target {
            break ValidationState::Satisfied;
        }
        tokio::select! {
            _ = &mut deadline => break ValidationState::TimedOut,
            next = in_flight.next() => {
                let Some((index, channel, ok)) = next else {
                    break ValidationState::Exhausted;
                };
                completed += 1;
                if ok {
                    valid.push((index, channel));
                }
                if valid.len() < target {
                    if let Some((index, channel)) = pending.next() {
                        in_flight.push(probe(index, channel));
                        probed += 1;
                    }
                }
                if completed % 3 == 0 {
                    log::debug!(
                        "[{}] Validation progress: {} valid / {} checked",
                        site.site_name(),
                        valid.len(),
                        completed
                    );
                }
            }
        }
    };
    drop(in_flight);

    valid.sort_by_key(|(index, _)| *index);
    let outcome = ValidationOutcome {
        valid: valid.into_iter().map(|(_, channel)| channel).collect(),
        state,
        probed,
        target,
    };

    match outcome.state {
        ValidationState::Satisfied => ctx.stats.increment_info(InfoType::ValidationTargetMet),
        ValidationState::TimedOut => ctx.stats.increment_warning(WarningType::ValidationTimedOut),
        ValidationState::Exhausted => ctx.stats.increment_warning(WarningType::ValidationShort),
    }
    log::info!(
        "[{}] Validation finished: {} valid links [{}] ({:?}, {} probed)",
        site.site_name(),
        outcome.valid.len(),
        outcome.status(),
        outcome.state,
        outcome.probed
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searcher::test_helpers::{candidates, ScriptedSearcher};
    use std::sync::atomic::Ordering;

    fn settings(workers: usize) -> ValidationSettings {
        ValidationSettings {
            enabled: true,
            workers,
            deadline: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_concurrency_ceiling() {
        assert_eq!(concurrency_ceiling(4, 10), 4);
        assert_eq!(concurrency_ceiling(500, 100), VALIDATION_HARD_CAP);
        assert_eq!(concurrency_ceiling(6, 2), 2);
        assert_eq!(concurrency_ceiling(0, 5), 1);
    }

    #[tokio::test]
    async fn test_serial_validation_probes_exactly_target() {
        let site = ScriptedSearcher::new(vec![]);
        let ctx = SearchContext::default();
        let outcome =
            validate_candidates(&site, candidates("CCTV-1", 10), 3, &settings(1), &ctx).await;

        assert_eq!(outcome.valid.len(), 3);
        assert_eq!(outcome.state, ValidationState::Satisfied);
        assert_eq!(outcome.status(), TargetStatus::Met);
        assert_eq!(site.probe_calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.probed, 3);
    }

    #[tokio::test]
    async fn test_early_exit_bound_with_concurrency() {
        let site = ScriptedSearcher::new(vec![]);
        let ctx = SearchContext::default();
        let workers = 4;
        let outcome =
            validate_candidates(&site, candidates("CCTV-1", 10), 3, &settings(workers), &ctx)
                .await;

        let calls = site.probe_calls.load(Ordering::SeqCst);
        assert_eq!(outcome.valid.len(), 3);
        assert!(calls <= 3 + workers - 1, "probe calls {} exceed bound", calls);
    }

    #[tokio::test]
    async fn test_output_in_input_order() {
        let site = ScriptedSearcher::new(vec![]).rejecting(&[0, 2]);
        let ctx = SearchContext::default();
        let outcome =
            validate_candidates(&site, candidates("CCTV-1", 5), 3, &settings(6), &ctx).await;

        let urls: Vec<&str> = outcome.valid.iter().map(|c| c.url()).collect();
        assert_eq!(
            urls,
            vec![
                "http://10.0.0.1:8080/cctv-1.m3u8",
                "http://10.0.0.3:8080/cctv-1.m3u8",
                "http://10.0.0.4:8080/cctv-1.m3u8",
            ]
        );
    }

    #[tokio::test]
    async fn test_short_when_supply_is_insufficient() {
        let site = ScriptedSearcher::new(vec![]).rejecting(&[0, 1, 2]);
        let ctx = SearchContext::default();
        let outcome =
            validate_candidates(&site, candidates("CCTV-1", 4), 3, &settings(2), &ctx).await;

        assert_eq!(outcome.state, ValidationState::Exhausted);
        assert_eq!(outcome.status(), TargetStatus::Short { found: 1, target: 3 });
        assert_eq!(outcome.status().to_string(), "short(1/3)");
        assert_eq!(ctx.stats.get_warning_count(WarningType::ValidationShort), 1);
    }

    #[tokio::test]
    async fn test_panicking_probe_counts_as_invalid() {
        let site = ScriptedSearcher::new(vec![]).panicking(&[1]);
        let ctx = SearchContext::default();
        let outcome =
            validate_candidates(&site, candidates("CCTV-1", 3), 3, &settings(3), &ctx).await;

        assert_eq!(outcome.valid.len(), 2);
        assert_eq!(ctx.stats.get_error_count(ErrorType::ProbePanicked), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_returns_partial_results() {
        let site = ScriptedSearcher::new(vec![]).slow(&[1, 2], Duration::from_secs(60));
        let ctx = SearchContext::default();
        let settings = ValidationSettings {
            enabled: true,
            workers: 3,
            deadline: Duration::from_secs(5),
        };
        let outcome = validate_candidates(&site, candidates("CCTV-1", 3), 3, &settings, &ctx).await;

        assert_eq!(outcome.state, ValidationState::TimedOut);
        assert_eq!(outcome.valid.len(), 1);
        assert_eq!(outcome.valid[0].url(), "http://10.0.0.0:8080/cctv-1.m3u8");
    }

    #[tokio::test]
    async fn test_disabled_validation_returns_first_n() {
        let site = ScriptedSearcher::new(vec![]);
        let ctx = SearchContext::default();
        let settings = ValidationSettings {
            enabled: false,
            ..settings(4)
        };
        let outcome = validate_candidates(&site, candidates("CCTV-1", 5), 2, &settings, &ctx).await;

        assert_eq!(outcome.valid.len(), 2);
        assert_eq!(outcome.probed, 0);
        assert_eq!(site.probe_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_network_budget_caps_in_flight_probes() {
        let site = ScriptedSearcher::new(vec![]).slow(&[0, 1, 2, 3, 4, 5], Duration::from_millis(20));
        let ctx = SearchContext::new(2);
        let _ = validate_candidates(&site, candidates("CCTV-1", 6), 6, &settings(6), &ctx).await;
        assert!(site.max_in_flight.load(Ordering::SeqCst) <= 2);
    }
}
