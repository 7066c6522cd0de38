//! regrtest argument assembly.
//!
//! regrtest reads some flags positionally, so the order here is fixed:
//! workers, verbosity, exclusions, pattern, pass-through, explicit tests.

use crate::config::RunConfiguration;

/// Build the regrtest argument vector for `config`.
pub fn build_arguments(config: &RunConfiguration) -> Vec<String> {
    let mut args = vec!["-j".to_string(), config.workers.resolve().to_string()];

    if config.verbose {
        args.push("-v".to_string());
    }

    let filters = &config.filters;
    for name in &filters.exclusions {
        args.push("-x".to_string());
        args.push(name.clone());
    }

    if let Some(pattern) = &filters.pattern {
        args.push("-k".to_string());
        args.push(pattern.clone());
    }

    args.extend(filters.passthrough.iter().cloned());
    args.extend(filters.tests.iter().cloned());
    args
}
