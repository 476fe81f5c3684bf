//! Command line driver for the tag reading session controller.
//!
//! Runs one reading session against the mock reader and prints the result.
//!
//! ```text
//! tagreader [--config FILE] [--empty N] [--tag HEX | --unknown | --cancel]
//! ```
//!
//! Set `RUST_LOG=debug` to follow the session phases.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tagreader_hardware::mock::{MockReader, MockReaderHandle};
use tagreader_hardware::{AnyTagReader, InvalidationError, TagTechnology};
use tagreader_session::{SessionConfig, SessionController};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// What the simulated radio does once the session is open.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Presentation {
    Tag(Vec<u8>),
    Unknown,
    Cancel,
}

#[derive(Debug)]
struct Options {
    config: Option<PathBuf>,
    empty_detections: usize,
    presentation: Presentation,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut options = Options {
        config: None,
        empty_detections: 0,
        presentation: Presentation::Tag(vec![0x04, 0x9F, 0xAB]),
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config requires a path")?;
                options.config = Some(PathBuf::from(path));
            }
            "--empty" => {
                let count = args.next().context("--empty requires a count")?;
                options.empty_detections = count
                    .parse()
                    .with_context(|| format!("invalid detection count: {}", count))?;
            }
            "--tag" => {
                let hex = args.next().context("--tag requires a hex identifier")?;
                options.presentation = Presentation::Tag(parse_hex(&hex)?);
            }
            "--unknown" => options.presentation = Presentation::Unknown,
            "--cancel" => options.presentation = Presentation::Cancel,
            other => bail!("unknown argument: {}", other),
        }
    }

    Ok(options)
}

fn parse_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.is_empty() || hex.len() % 2 != 0 {
        bail!("hex identifier must have an even, non-zero number of digits");
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            let digits = hex.get(i..i + 2).context("hex identifier must be ASCII")?;
            u8::from_str_radix(digits, 16)
                .with_context(|| format!("invalid hex digits: {}", digits))
        })
        .collect()
}

fn load_config(path: Option<&PathBuf>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

async fn drive_reader(
    handle: MockReaderHandle,
    empty_detections: usize,
    presentation: Presentation,
) -> Result<()> {
    while !handle.is_session_open() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    handle.activate().await?;
    for _ in 0..empty_detections {
        handle.detect_nothing().await?;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    match presentation {
        Presentation::Tag(identifier) => {
            handle.detect(vec![TagTechnology::iso7816(identifier)]).await?;
        }
        Presentation::Unknown => {
            handle
                .detect(vec![TagTechnology::unknown("proprietary")])
                .await?;
        }
        Presentation::Cancel => handle.invalidate(InvalidationError::UserCanceled).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = parse_args(std::env::args().skip(1))?;
    let config = load_config(options.config.as_ref())?;
    info!("tagreader {}", tagreader_core::VERSION);

    let (reader, handle) = MockReader::new();
    info!("Using {}", handle.name());
    let controller = SessionController::spawn(AnyTagReader::Mock(reader), config)?;

    let driver = tokio::spawn(drive_reader(
        handle,
        options.empty_detections,
        options.presentation,
    ));

    match controller.read().await {
        Some(Ok(message)) => println!("{}", message),
        Some(Err(e)) => println!("Reading failed: {}", e),
        None => println!("Reading session closed"),
    }

    if let Err(e) = driver.await? {
        warn!("Reader simulation stopped early: {}", e);
    }
    controller.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let options = parse_args(Vec::new()).unwrap();
        assert!(options.config.is_none());
        assert_eq!(options.empty_detections, 0);
        assert_eq!(options.presentation, Presentation::Tag(vec![0x04, 0x9F, 0xAB]));
    }

    #[test]
    fn test_parse_scenario() {
        let options = parse_args(args(&["--empty", "2", "--tag", "DEADbeef"])).unwrap();
        assert_eq!(options.empty_detections, 2);
        assert_eq!(
            options.presentation,
            Presentation::Tag(vec![0xDE, 0xAD, 0xBE, 0xEF])
        );

        let options = parse_args(args(&["--cancel"])).unwrap();
        assert_eq!(options.presentation, Presentation::Cancel);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args(&["--tag", "abc"])).is_err());
        assert!(parse_args(args(&["--tag", "zz"])).is_err());
        assert!(parse_args(args(&["--empty"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }

    #[test]
    fn test_default_config_without_path() {
        assert_eq!(load_config(None).unwrap(), SessionConfig::default());
    }
}
