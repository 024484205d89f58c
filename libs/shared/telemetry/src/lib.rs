//! Tracing bootstrap shared by the engine binary, the migrator, and tests.
//!
//! Development builds get compact, human-readable lines; release builds get
//! flattened JSON events suitable for ingestion by a log pipeline. Both
//! modes honor `RUST_LOG` when set.

use std::panic;

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global tracing subscriber and installs a panic hook that
/// logs the panicking thread's location before the process continues
/// unwinding. `service_name` seeds the default filter directive and is
/// reported in the panic hook's span fields.
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if cfg!(debug_assertions) { "debug" } else { "info" };
        format!("{service_name}={level},libsql=warn").into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    let service = service_name.to_string();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<no panic message>");
        error!(target: "panic", service = %service, location = %location, "panic: {payload}");
    }));

    info!(service = %service_name, "tracing initialized");
}
