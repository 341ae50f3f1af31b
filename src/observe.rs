use std::time::Duration;

use crate::error::Error;

pub(crate) fn record_ok(operation: &'static str, elapsed: Duration, count: usize) {
    let _ = (operation, elapsed, count);

    #[cfg(feature = "metrics")]
    {
        metrics::counter!("ipmimonitoring_reads_total", "operation" => operation, "outcome" => "ok")
            .increment(1);
        metrics::histogram!("ipmimonitoring_read_seconds", "operation" => operation)
            .record(elapsed.as_secs_f64());
    }

    #[cfg(feature = "tracing")]
    {
        tracing::debug!(
            operation,
            count,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "sensor read ok"
        );
    }
}

pub(crate) fn record_err(operation: &'static str, elapsed: Duration, err: &Error) {
    let _ = (operation, elapsed, err);

    #[cfg(feature = "metrics")]
    {
        metrics::counter!("ipmimonitoring_reads_total", "operation" => operation, "outcome" => "err")
            .increment(1);
        metrics::counter!(
            "ipmimonitoring_read_errors_total",
            "operation" => operation,
            "kind" => error_kind(err)
        )
        .increment(1);
        metrics::histogram!("ipmimonitoring_read_seconds", "operation" => operation)
            .record(elapsed.as_secs_f64());
    }

    #[cfg(feature = "tracing")]
    {
        tracing::warn!(
            operation,
            error = %err,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "sensor read failed"
        );
    }
}

#[cfg(feature = "metrics")]
fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::Init { .. } => "init",
        Error::ContextCreation => "context_creation",
        Error::Configuration { .. } => "configuration",
        Error::Read { .. } => "read",
        Error::UnknownEnumValue { .. } => "unknown_enum_value",
        Error::Decoding(_) => "decoding",
        Error::Closed => "closed",
        Error::LibraryLoad(_) => "library_load",
        Error::InvalidArgument(_) => "invalid_argument",
        Error::ParseEnum { .. } => "parse_enum",
    }
}
