use std::str::FromStr;

use color_eyre::eyre::{Result, eyre};
use tracing::Level;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(eyre!("unknown log format `{other}` (expected text or json)")),
        }
    }
}

pub fn parse_level(s: &str) -> Result<Level> {
    Level::from_str(s).map_err(|_| eyre!("unknown log level `{s}`"))
}

/// Installs the global subscriber. Logs go to stderr so stdout carries only
/// snapshots.
pub fn init_tracing(format: LogFormat, level: Level) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => {
            let subscriber = builder.with_ansi(false).json().finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };
    installed.map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn parses_levels() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert!(parse_level("loud").is_err());
    }
}
