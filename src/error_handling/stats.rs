//! Run statistics tracking.
//!
//! Thread-safe counters for errors, warnings, and informational events seen
//! while searching, probing, and batching channels.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType, WarningType};

/// Thread-safe run statistics tracker.
///
/// Every counter is created up front from the enum variants, so increments
/// never allocate and the struct can be shared across tasks behind an `Arc`.
///
/// - **Errors**: failures that cost a page, a probe or a channel its results
/// - **Warnings**: degraded results (short validation, empty channels)
/// - **Info**: notable events such as cache hits and early stops
pub struct ProcessingStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    warnings: HashMap<WarningType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
}

/// Point-in-time copy of the non-zero counters, keyed by label.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub errors: BTreeMap<String, usize>,
    pub warnings: BTreeMap<String, usize>,
    pub info: BTreeMap<String, usize>,
}

fn counters<T: IntoEnumIterator + Eq + Hash>() -> HashMap<T, AtomicUsize> {
    T::iter().map(|t| (t, AtomicUsize::new(0))).collect()
}

fn bump<T: Eq + Hash + std::fmt::Debug>(map: &HashMap<T, AtomicUsize>, key: T) {
    match map.get(&key) {
        Some(counter) => {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        None => log::error!(
            "Counter for {:?} is missing; ProcessingStats was not built with new()",
            key
        ),
    }
}

fn read<T: Eq + Hash>(map: &HashMap<T, AtomicUsize>, key: T) -> usize {
    map.get(&key).map(|c| c.load(Ordering::SeqCst)).unwrap_or(0)
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        ProcessingStats {
            errors: counters(),
            warnings: counters(),
            info: counters(),
        }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, error: ErrorType) {
        bump(&self.errors, error);
    }

    /// Increment a warning counter.
    pub fn increment_warning(&self, warning: WarningType) {
        bump(&self.warnings, warning);
    }

    /// Increment an info counter.
    pub fn increment_info(&self, info_type: InfoType) {
        bump(&self.info, info_type);
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        read(&self.errors, error)
    }

    pub fn get_warning_count(&self, warning: WarningType) -> usize {
        read(&self.warnings, warning)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        read(&self.info, info_type)
    }

    /// Get total error count across all error types.
    pub fn total_errors(&self) -> usize {
        ErrorType::iter().map(|e| self.get_error_count(e)).sum()
    }

    /// Get total warning count across all warning types.
    pub fn total_warnings(&self) -> usize {
        WarningType::iter().map(|w| self.get_warning_count(w)).sum()
    }

    /// Get total info count across all info types.
    pub fn total_info(&self) -> usize {
        InfoType::iter().map(|i| self.get_info_count(i)).sum()
    }

    /// Copies the non-zero counters into a serializable snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot::default();
        for e in ErrorType::iter() {
            let n = self.get_error_count(e);
            if n > 0 {
                snapshot.errors.insert(e.as_str().to_string(), n);
            }
        }
        for w in WarningType::iter() {
            let n = self.get_warning_count(w);
            if n > 0 {
                snapshot.warnings.insert(w.as_str().to_string(), n);
            }
        }
        for i in InfoType::iter() {
            let n = self.get_info_count(i);
            if n > 0 {
                snapshot.info.insert(i.as_str().to_string(), n);
            }
        }
        snapshot
    }
}
