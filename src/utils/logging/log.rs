//! Logging utilities
//!
//! This module provides standardized logging functions for evaluations.
//! Only episode identifiers and component names are logged; clinical free
//! text and identities never reach the log.

use std::time::Duration;

/// Install `env_logger` with an `info` default filter.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(cfg!(test))
        .try_init();
}

/// Log an evaluation start with consistent format
///
/// # Arguments
/// * `component` - Name of the evaluating component
/// * `episode_id` - Episode being evaluated
pub fn log_evaluation_start(component: &str, episode_id: &str) {
    log::debug!("{component}: evaluating episode {episode_id}");
}

/// Log an evaluation completion with consistent format
///
/// # Arguments
/// * `component` - Name of the evaluating component
/// * `episode_id` - Episode that was evaluated
/// * `outcome` - Short outcome label
/// * `elapsed` - Optional elapsed time
pub fn log_evaluation_complete(
    component: &str,
    episode_id: &str,
    outcome: &str,
    elapsed: Option<Duration>,
) {
    if let Some(duration) = elapsed {
        log::info!("{component}: episode {episode_id} -> {outcome} in {duration:?}");
    } else {
        log::info!("{component}: episode {episode_id} -> {outcome}");
    }
}

/// Log a warning with an optional episode reference
pub fn log_warning(message: &str, episode_id: Option<&str>) {
    if let Some(id) = episode_id {
        log::warn!("{message}: episode {id}");
    } else {
        log::warn!("{message}");
    }
}
