use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{ApiConfig, CredentialStore, FileCredentialStore};
use services::{AppServices, Clock};
use ui::{App, UiApp, build_app_context};

const DEFAULT_CREDENTIALS_PATH: &str = ".academy/credentials.json";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidApiUrl { raw: String },
    InvalidTimeout { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api-url value: {raw}"),
            ArgsError::InvalidTimeout { raw } => write!(f, "invalid --timeout-secs value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api-url <url>] [--credentials <path>] [--timeout-secs <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url {}", api::config::DEFAULT_API_URL);
    eprintln!("  --credentials {DEFAULT_CREDENTIALS_PATH}");
    eprintln!("  --timeout-secs {}", api::config::DEFAULT_TIMEOUT.as_secs());
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ACADEMY_API_URL, ACADEMY_API_TIMEOUT_SECS, ACADEMY_CREDENTIALS, ACADEMY_LOG");
}

#[derive(Debug)]
struct Args {
    api: ApiConfig,
    credentials_path: PathBuf,
}

impl Args {
    /// Defaults from the environment, before flags are applied.
    fn from_env() -> Result<Self, ArgsError> {
        let api = ApiConfig::from_env().map_err(|_| ArgsError::InvalidApiUrl {
            raw: std::env::var("ACADEMY_API_URL").unwrap_or_default(),
        })?;
        let credentials_path = std::env::var("ACADEMY_CREDENTIALS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH), PathBuf::from);
        Ok(Self {
            api,
            credentials_path,
        })
    }

    /// Apply command-line flags on top of `self`. `Ok(None)` means help was
    /// requested.
    fn parse(mut self, args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => {
                    let value = require_value(args, "--api-url")?;
                    let timeout = self.api.timeout();
                    self.api = ApiConfig::new(&value, timeout)
                        .map_err(|_| ArgsError::InvalidApiUrl { raw: value })?;
                }
                "--credentials" => {
                    let value = require_value(args, "--credentials")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::MissingValue {
                            flag: "--credentials",
                        });
                    }
                    self.credentials_path = PathBuf::from(value);
                }
                "--timeout-secs" => {
                    let value = require_value(args, "--timeout-secs")?;
                    let secs: u64 = value
                        .trim()
                        .parse()
                        .ok()
                        .filter(|secs| *secs > 0)
                        .ok_or_else(|| ArgsError::InvalidTimeout { raw: value.clone() })?;
                    self.api = self.api.with_timeout(Duration::from_secs(secs));
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Some(self))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ACADEMY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::from_env()
        .and_then(|defaults| defaults.parse(&mut argv))
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;
    let Some(parsed) = parsed else {
        print_usage();
        return Ok(());
    };

    init_tracing();
    info!(
        api_url = %parsed.api.base_url(),
        credentials = %parsed.credentials_path.display(),
        "starting academy client"
    );

    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(parsed.credentials_path));
    let services = AppServices::new_http(parsed.api, credentials, Clock::default_clock())?;

    let app: Arc<dyn UiApp> = Arc::new(services);
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Academy")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Args {
        Args {
            api: ApiConfig::local().unwrap(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
        }
    }

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_string());
        defaults().parse(&mut iter)
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--api-url",
            "https://school.example.com",
            "--credentials",
            "/tmp/creds.json",
            "--timeout-secs",
            "3",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(args.api.base_url().as_str(), "https://school.example.com/");
        assert_eq!(args.api.timeout(), Duration::from_secs(3));
        assert_eq!(args.credentials_path, PathBuf::from("/tmp/creds.json"));
    }

    #[test]
    fn no_flags_keep_defaults() {
        let args = parse(&[]).unwrap().unwrap();
        assert_eq!(args.api.base_url().as_str(), "http://localhost:8000/");
        assert_eq!(args.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_PATH));
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(
            parse(&["--timeout-secs", "0"]),
            Err(ArgsError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            parse(&["--api-url", "localhost"]),
            Err(ArgsError::InvalidApiUrl { .. })
        ));
        assert!(matches!(
            parse(&["--timeout-secs"]),
            Err(ArgsError::MissingValue { .. })
        ));
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
    }
}
