use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer};

/// The handle of the file log writer. Dropping it flushes and disables the
/// writer, therefore it must live until the program exits.
pub struct LogHandle {
    #[allow(dead_code)]
    guard: Option<WorkerGuard>,
}

/// Sets up the global tracing subscriber.
///
/// Events are always written to stdout. If `log_dir` is given, they are
/// written to a new file in it as well, one JSON object per line.
///
/// Verbosity defaults to INFO and can be changed with `RUST_LOG`.
pub fn init(log_dir: Option<&Path>) -> Result<LogHandle> {
    let filter = EnvFilter::builder()
        // defaults to INFO if RUST_LOG not set
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let stdout = fmt::layer().with_writer(std::io::stdout);

    let (file, guard) = match log_dir {
        Some(log_dir) => {
            let file_appender =
                tracing_appender::rolling::never(log_dir, log_file_name(&chrono::Local::now()));
            let (non_blocking_log_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking_log_writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let collector = tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file);
    tracing::subscriber::set_global_default(collector)
        .context("Unable to set a global collector")?;

    Ok(LogHandle { guard })
}

fn log_file_name<Tz>(time: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y-%m-%d_%H-%M-%S.log").to_string().into()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_log_file_name() {
        let time = Utc.with_ymd_and_hms(2023, 4, 9, 17, 3, 58).unwrap();
        assert_eq!(
            log_file_name(&time),
            PathBuf::from("2023-04-09_17-03-58.log")
        );
    }
}
