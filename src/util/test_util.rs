use std::path::Path;
use tracing::subscriber::set_default;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;

pub struct TracingGuards {
    _subscriber_guard: tracing::subscriber::DefaultGuard,
    _worker_guard: WorkerGuard,
}

/// Routes DEBUG+ output of the current thread to `tests/logs/<test_name>.log`.
///
/// Hold the returned guards for the duration of the test.
pub fn setup_test_tracing(test_name: &str) -> TracingGuards {
    let log_dir = Path::new("tests/logs");
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir).unwrap();
    }

    let file_appender = tracing_appender::rolling::never(log_dir, format!("{}.log", test_name));
    let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = fmt::Subscriber::builder()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let subscriber_guard = set_default(subscriber);

    TracingGuards {
        _subscriber_guard: subscriber_guard,
        _worker_guard: worker_guard,
    }
}
