//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout carries only the run summary. `RUST_LOG`
//! overrides the default filter; `LOG_FORMAT=json` switches to JSON lines.

use tracing::subscriber::SetGlobalDefaultError;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "cloudflare_logs_downloader=info";

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Read the format from `LOG_FORMAT`
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref())
    }

    /// Interpret a `LOG_FORMAT` value; anything but `json` is human-readable
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Human,
        }
    }
}

/// Build the filter from `directives`, falling back to [`DEFAULT_FILTER`]
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Build a subscriber writing to `writer`
pub fn subscriber<W>(
    format: LogFormat,
    filter: EnvFilter,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    match format {
        LogFormat::Json => Box::new(builder.json().finish()),
        LogFormat::Human => Box::new(builder.finish()),
    }
}

/// Install the global subscriber on stderr
pub fn init_tracing(format: LogFormat) -> Result<(), SetGlobalDefaultError> {
    let directives = std::env::var("RUST_LOG").ok();
    tracing::subscriber::set_global_default(subscriber(
        format,
        env_filter(directives.as_deref()),
        std::io::stderr,
    ))
}
