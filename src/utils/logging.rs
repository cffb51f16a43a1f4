//! Logging setup on top of `env_logger`.

use env_logger::Env;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    /// Level used when `RUST_LOG` is not set.
    pub const fn default_for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Info
        } else {
            Self::Warn
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        }
    }
}

/// Builds the default filter string. Noisy HTTP internals stay at `warn`.
pub fn default_filter(level: LogLevel) -> String {
    format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,h2=warn,tao=warn,wry=warn",
        level.as_str()
    )
}

/// Initializes the global logger. `RUST_LOG` overrides the default filter.
pub fn init_from_env() {
    let filter = default_filter(LogLevel::default_for_build());
    let result = env_logger::Builder::from_env(Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .try_init();

    if let Err(e) = result {
        eprintln!("Logger already initialized: {e}");
    }
}
