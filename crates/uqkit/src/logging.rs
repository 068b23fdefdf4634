use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
///
/// `uqkit_core` stays at `info` so design runtime advisories reach the user
/// while its per-design `debug!` shapes stay hidden.
pub fn default_filter(level: &str) -> String {
    format!("uqkit={level},uqkit_core=info")
}

/// Initialize logging on stderr, optionally mirrored to a file.
///
/// The log level can be controlled via the `level` parameter or the `RUST_LOG`
/// environment variable.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> color_eyre::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()?;

    tracing::debug!(level, "uqkit logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::Arc;

    use uqkit_core::sampling::SampleCount;

    use crate::models::ModelData;
    use crate::study::{MethodData, Study, run_study};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(level: &str, f: impl FnOnce()) -> String {
        let buffer = Captured::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(default_filter(level)))
            .with(
                fmt::layer()
                    .with_writer(move || writer.clone())
                    .with_ansi(false),
            );
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_runtime_advisory_visible_by_default() {
        let study = Study {
            model: ModelData::linear(),
            seed: Some(4),
            method: MethodData::MonteCarlo {
                n: SampleCount::Exact(8),
                skip: true,
            },
            analysis: None,
        };
        let logs = captured_logs("warn", || {
            run_study(&study).unwrap();
        });
        assert!(
            logs.contains("design runtime estimates unavailable"),
            "advisory missing from logs: {logs}"
        );
        // The CLI's own info events follow the requested level
        assert!(!logs.contains("running study"), "{logs}");
    }

    #[test]
    fn test_default_filter_keeps_core_debug_hidden() {
        let study = Study {
            model: ModelData::linear(),
            seed: Some(4),
            method: MethodData::Hybrid {
                n: SampleCount::Exact(4),
                plan: Default::default(),
                skip: true,
            },
            analysis: None,
        };
        let logs = captured_logs("debug", || {
            run_study(&study).unwrap();
        });
        assert!(logs.contains("running study"), "{logs}");
        assert!(!logs.contains("assembled hybrid design"), "{logs}");
    }
}
