use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ColorChoice, ConfigBuilder, TerminalMode};

/// Crates whose logs are hidden unless the level is Trace. Request handling in
/// axum, the session store and the storage client all log every call at debug.
const DEPENDENCY_MODULES: &[&str] = &[
    "sqlx",
    "sea_orm",
    "tower",
    "tower_sessions",
    "tracing",
    "hyper",
    "axum",
    "reqwest",
    "reqwest_retry",
];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger for `config`.
    ///
    /// Production deployments write plain, uncoloured lines to stderr for the log
    /// collector. Elsewhere output is mixed between stdout and stderr and coloured
    /// when attached to a terminal.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;
        let (mode, color) = Self::terminal(config.is_production());

        simplelog::TermLogger::init(
            Self::convert_level_filter(level),
            Self::build_log_config(Self::should_filter_dependencies(level)),
            mode,
            color,
        )
    }

    fn terminal(is_production: bool) -> (TerminalMode, ColorChoice) {
        if is_production {
            (TerminalMode::Stderr, ColorChoice::Never)
        } else {
            (TerminalMode::Mixed, ColorChoice::Auto)
        }
    }

    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn build_log_config(filter_dependencies: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if filter_dependencies {
            for module in DEPENDENCY_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
