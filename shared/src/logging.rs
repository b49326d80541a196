//! Shared logging utilities for consistent tracing across the swarm

use chrono::{DateTime, Utc};

/// Initialize stdout tracing with an env-filter built from `log_level`.
///
/// Safe to call more than once (later calls are ignored), which keeps test
/// binaries from panicking when several tests set up logging.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let base_level = log_level.unwrap_or("info");
    let env_filter = format!("controller={base_level},allocator={base_level},shared={base_level}");

    let _ = fmt()
        .with_env_filter(EnvFilter::new(&env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for vehicle-scoped info logging
#[macro_export]
macro_rules! vehicle_info {
    ($vehicle_id:expr, $($arg:tt)*) => {
        tracing::info!(
            vehicle = $vehicle_id,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for vehicle-scoped warning logging
#[macro_export]
macro_rules! vehicle_warn {
    ($vehicle_id:expr, $($arg:tt)*) => {
        tracing::warn!(
            vehicle = $vehicle_id,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for vehicle-scoped error logging
#[macro_export]
macro_rules! vehicle_error {
    ($vehicle_id:expr, $($arg:tt)*) => {
        tracing::error!(
            vehicle = $vehicle_id,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for vehicle-scoped debug logging
#[macro_export]
macro_rules! vehicle_debug {
    ($vehicle_id:expr, $($arg:tt)*) => {
        tracing::debug!(
            vehicle = $vehicle_id,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}
