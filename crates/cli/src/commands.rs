use crate::{
    env::{ACCESS_TOKEN, API_VERSION, DATASET_ID, EnvManager, PIXEL_ID},
    error::CliError,
};
use clap::{Args, Subcommand};
use connectors::{adapter::SourceSpec, file::csv::settings::CsvSettings};
use engine_core::{
    config::{
        ApiSettings, BackfillConfig, Credentials, DEFAULT_API_BASE, DEFAULT_API_VERSION,
        DEFAULT_BATCH_PAUSE_MS, DEFAULT_BATCH_SIZE, DEFAULT_TIMEOUT_SECS, DEFAULT_UPLOAD_TAG,
    },
    error::ConfigError,
};
use model::core::mode::EventMode;
use std::{str::FromStr, time::Duration};

#[derive(Subcommand)]
pub enum Commands {
    /// Send eligible historical purchases to the Conversions API
    Run {
        #[command(flatten)]
        args: BackfillArgs,

        #[arg(long, help = "Build and count events without calling the API")]
        dry_run: bool,

        #[arg(
            long,
            help = "If specified, writes the JSON summary to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Print the events built from the first rows of a source
    Inspect {
        #[command(flatten)]
        args: BackfillArgs,

        #[arg(long, default_value_t = 5, help = "Number of rows to build")]
        limit: usize,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BackfillArgs {
    #[arg(long, default_value = "web", help = "Event mode: web or offline")]
    pub mode: String,

    #[arg(long, help = "Pixel id (web mode); falls back to PIXEL_ID")]
    pub pixel_id: Option<String>,

    #[arg(long, help = "Offline dataset id; falls back to DATASET_ID")]
    pub dataset_id: Option<String>,

    #[arg(long, help = "API access token; falls back to ACCESS_TOKEN")]
    pub access_token: Option<String>,

    #[arg(long, help = "Graph API version; falls back to API_VERSION, then v19.0")]
    pub api_version: Option<String>,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    #[arg(long, help = "Tag web events with a test event code")]
    pub test: bool,

    #[arg(long, help = "Explicit test event code (implies --test)")]
    pub test_event_code: Option<String>,

    #[arg(long, default_value = DEFAULT_UPLOAD_TAG, help = "Upload tag for offline batches")]
    pub upload_tag: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Request timeout in seconds")]
    pub timeout: u64,

    #[arg(long, default_value_t = DEFAULT_BATCH_PAUSE_MS, help = "Pause after each batch, in ms")]
    pub pause_ms: u64,

    #[arg(long, help = "Keep web rows that carry no attribution signal")]
    pub no_strict: bool,

    #[arg(long, help = "CSV file to read purchases from")]
    pub csv: Option<String>,

    #[arg(long, default_value_t = ',', help = "CSV field delimiter")]
    pub delimiter: char,

    #[arg(long, help = "Postgres connection string")]
    pub pg_url: Option<String>,

    #[arg(long, help = "Query returning one purchase per row")]
    pub query: Option<String>,

    #[arg(long, help = "Env file to load (defaults to ./.env when present)")]
    pub env_file: Option<String>,
}

impl BackfillArgs {
    /// Loads the process environment plus the requested or default .env file.
    pub fn environment(&self) -> Result<EnvManager, CliError> {
        let mut env = EnvManager::from_process();
        match &self.env_file {
            Some(path) => env.load_from_file(path)?,
            None => {
                env.load_optional(".env")?;
            }
        }
        Ok(env)
    }

    /// Resolves flags, falling back to the environment for credentials and ids.
    pub fn resolve(&self, env: &EnvManager, dry_run: bool) -> Result<BackfillConfig, CliError> {
        let mode =
            EventMode::from_str(&self.mode).map_err(|_| CliError::InvalidMode(self.mode.clone()))?;

        let (flag, var) = match mode {
            EventMode::Web => (&self.pixel_id, PIXEL_ID),
            EventMode::Offline => (&self.dataset_id, DATASET_ID),
        };
        let namespace = pick(flag.as_deref(), env.get(var)).unwrap_or_default();
        let token = pick(self.access_token.as_deref(), env.get(ACCESS_TOKEN)).unwrap_or_default();

        let mut config = BackfillConfig::new(mode, &namespace, Credentials::new(&token));
        config.api = ApiSettings {
            base_url: self.api_base.trim().to_string(),
            version: pick(self.api_version.as_deref(), env.get(API_VERSION))
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: Duration::from_secs(self.timeout),
        };
        config.batch_size = self.batch_size;
        config.test_mode = self.test || self.test_event_code.is_some();
        config.test_event_code = self.test_event_code.clone();
        config.upload_tag = self.upload_tag.clone();
        config.strict_attribution = !self.no_strict;
        config.batch_pause = Duration::from_millis(self.pause_ms);
        config.dry_run = dry_run;
        Ok(config)
    }

    pub fn source(&self) -> Result<SourceSpec, CliError> {
        match (&self.csv, &self.pg_url, &self.query) {
            (Some(path), None, _) => Ok(SourceSpec::Csv {
                path: path.clone(),
                settings: CsvSettings::new(self.delimiter),
            }),
            (None, Some(url), Some(query)) => Ok(SourceSpec::postgres(url, query)),
            (None, Some(_), None) => Err(ConfigError::InvalidValue {
                key: "query".into(),
                message: "--pg-url needs --query".into(),
            }
            .into()),
            (Some(_), Some(_), _) => Err(ConfigError::InvalidValue {
                key: "source".into(),
                message: "use either --csv or --pg-url, not both".into(),
            }
            .into()),
            (None, None, _) => Err(ConfigError::MissingSource.into()),
        }
    }
}

fn pick(flag: Option<&str>, env: Option<&str>) -> Option<String> {
    flag.map(str::trim)
        .filter(|v| !v.is_empty())
        .or(env)
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: BackfillArgs,
    }

    fn parse(argv: &[&str]) -> BackfillArgs {
        let mut full = vec!["test"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--csv", "orders.csv", "--pixel-id", "123", "--access-token", "t"]);
        let config = args.resolve(&EnvManager::default(), false).unwrap();

        assert_eq!(config.mode, EventMode::Web);
        assert_eq!(config.namespace, "123");
        assert_eq!(config.batch_size, 400);
        assert_eq!(config.api.version, "v19.0");
        assert_eq!(config.batch_pause, Duration::from_millis(250));
        assert!(config.strict_attribution);
        assert!(config.validate().is_ok());
        assert!(matches!(args.source().unwrap(), SourceSpec::Csv { .. }));
    }

    #[test]
    fn test_env_fallback_by_mode() {
        let mut env = EnvManager::default();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "ACCESS_TOKEN=from-env\nPIXEL_ID=111\nDATASET_ID=222\nAPI_VERSION=v20.0\n",
        )
        .unwrap();
        env.load_from_file(file.path()).unwrap();

        let offline = parse(&["--mode", "offline", "--csv", "x.csv"])
            .resolve(&env, false)
            .unwrap();
        assert_eq!(offline.namespace, "222");
        assert_eq!(offline.credentials.access_token(), "from-env");
        assert_eq!(offline.api.version, "v20.0");

        let web = parse(&["--csv", "x.csv", "--pixel-id", "999"])
            .resolve(&env, false)
            .unwrap();
        assert_eq!(web.namespace, "999");
    }

    #[test]
    fn test_missing_token_fails_validation() {
        let config = parse(&["--csv", "x.csv", "--pixel-id", "123"])
            .resolve(&EnvManager::default(), false)
            .unwrap();
        assert_eq!(config.validate(), Err(ConfigError::MissingAccessToken));
    }

    #[test]
    fn test_invalid_mode() {
        let result = parse(&["--mode", "store"]).resolve(&EnvManager::default(), false);
        assert!(matches!(result, Err(CliError::InvalidMode(_))));
    }

    #[test]
    fn test_source_selection() {
        assert!(matches!(
            parse(&[]).source(),
            Err(CliError::InvalidSettings(ConfigError::MissingSource))
        ));
        assert!(parse(&["--pg-url", "postgres://localhost/db"]).source().is_err());
        assert!(matches!(
            parse(&["--pg-url", "postgres://localhost/db", "--query", "SELECT 1"]).source(),
            Ok(SourceSpec::Postgres { .. })
        ));
    }

    #[test]
    fn test_event_code_implies_test_mode() {
        let config = parse(&["--csv", "x.csv", "--pixel-id", "1234567890", "--test-event-code", "TEST42"])
            .resolve(&EnvManager::default(), false)
            .unwrap();
        assert!(config.test_mode);
        assert_eq!(config.test_event_code().as_deref(), Some("TEST42"));
    }
}
