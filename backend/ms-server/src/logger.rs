use crate::error::{Result as ServerErrorResult, ServerError};

use ms_config::LoggingConfig;

use std::fmt::Arguments;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record, info};

/// Crates whose routine chatter is capped at `warn`
const QUIET_TARGETS: [&str; 3] = ["sqlx", "hyper", "h2"];

/// Where log records go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Plain records appended to a file
    File(PathBuf),
    /// stdout, with ANSI level colours when `colored`
    Stdout { colored: bool },
}

impl LogSink {
    /// Resolve the sink for `config`; a log file lives in `config_dir/<dir>/<file>`
    pub fn from_config(config: &LoggingConfig, config_dir: &Path) -> Self {
        match &config.file {
            Some(file) => Self::File(config_dir.join(&config.dir).join(file)),
            None => Self::Stdout {
                colored: config.colored,
            },
        }
    }
}

/// Install the process-wide `log` backend
pub fn initialize(level: LevelFilter, sink: &LogSink) -> ServerErrorResult<()> {
    let output = match sink {
        LogSink::File(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = fern::log_file(path).map_err(|e| ServerError::Logger {
                message: format!("cannot open {}: {e}", path.display()),
            })?;
            Dispatch::new().format(plain_format).chain(file)
        }
        LogSink::Stdout { colored: true } => {
            let colors = ColoredLevelConfig::new()
                .error(Color::Red)
                .warn(Color::Yellow)
                .info(Color::Green)
                .debug(Color::Cyan)
                .trace(Color::BrightBlack);

            Dispatch::new()
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "{} {:<5} {} > {}",
                        humantime::format_rfc3339_seconds(SystemTime::now()),
                        colors.color(record.level()),
                        record.target(),
                        message
                    ))
                })
                .chain(std::io::stdout())
        }
        // containers and journald add their own colouring
        LogSink::Stdout { colored: false } => {
            Dispatch::new().format(plain_format).chain(std::io::stdout())
        }
    };

    QUIET_TARGETS
        .iter()
        .fold(Dispatch::new().level(level), |dispatch, target| {
            dispatch.level_for(*target, level.min(LevelFilter::Warn))
        })
        .chain(output)
        .apply()
        .map_err(|e| ServerError::Logger {
            message: e.to_string(),
        })?;

    info!("Logging at {level} to {sink:?}");

    Ok(())
}

fn plain_format(out: FormatCallback, message: &Arguments, record: &Record) {
    out.finish(format_args!(
        "{} {:<5} {} ({}:{}) > {}",
        humantime::format_rfc3339_millis(SystemTime::now()),
        record.level(),
        record.target(),
        record.file().unwrap_or("?"),
        record.line().unwrap_or_default(),
        message
    ))
}
