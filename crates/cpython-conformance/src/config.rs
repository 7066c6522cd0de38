//! Run configuration: worker count, verbosity and filters.

use crate::error::ConformanceError;
use crate::filter::FilterSet;
use crate::Result;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

const AUTO: &str = "auto";

/// Requested engine parallelism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCount {
    /// Derive from host parallelism.
    Auto,
    Fixed(NonZeroUsize),
}

impl WorkerCount {
    /// Concrete worker count; `Auto` is never below 1.
    pub fn resolve(self) -> usize {
        match self {
            WorkerCount::Auto => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
                .max(1),
            WorkerCount::Fixed(n) => n.get(),
        }
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        WorkerCount::Fixed(NonZeroUsize::MIN)
    }
}

impl FromStr for WorkerCount {
    type Err = ConformanceError;

    fn from_str(s: &str) -> Result<Self> {
        if s == AUTO {
            return Ok(WorkerCount::Auto);
        }
        s.parse::<NonZeroUsize>()
            .map(WorkerCount::Fixed)
            .map_err(|_| ConformanceError::InvalidWorkerCount(s.to_string()))
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerCount::Auto => f.write_str(AUTO),
            WorkerCount::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// Resolve `"auto"` or a positive integer to a worker count.
pub fn resolve_worker_count(requested: &str) -> Result<usize> {
    requested.parse::<WorkerCount>().map(WorkerCount::resolve)
}

/// Everything needed to assemble one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    pub workers: WorkerCount,
    pub verbose: bool,
    pub filters: FilterSet,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            workers: WorkerCount::default(),
            verbose: true,
            filters: FilterSet::default(),
        }
    }
}
