use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, error};

use tax_api_client::ReqwestTransport;
use tax_cli::app::{self, ErrorReport, TaxService};
use tax_cli::logging::init_logging;
use tax_core::config::EnvVar;
use tax_core::TaxServiceConfig;
use tax_core::ports::CacheConfig;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Progressive income tax calculator backed by a remote tax authority.
///
/// Results are printed to stdout as JSON; logs go to stderr.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Base URL of the tax authority.
    #[arg(long, env = "TAX_API_BASE_URL", global = true)]
    tax_api_base_url: Option<String>,

    /// Upper bound for a single request, in milliseconds.
    #[arg(long, env = "TAX_API_TIMEOUT_MS", global = true)]
    tax_api_timeout_ms: Option<String>,

    /// Total attempts per lookup, first one included.
    #[arg(long, env = "TAX_API_MAX_RETRIES", global = true)]
    tax_api_max_retries: Option<String>,

    /// Backoff unit in milliseconds; attempt n waits n times this.
    #[arg(long, env = "TAX_API_RETRY_BACKOFF_MS", global = true)]
    tax_api_retry_backoff_ms: Option<String>,

    /// Lifetime of cached bracket tables, in seconds.
    #[arg(long, env = "TAX_RATE_CACHE_TTL_SECONDS", global = true)]
    tax_rate_cache_ttl_seconds: Option<String>,

    /// Cache backend (`memory` or `sqlite`).
    #[arg(long, env = "TAX_CACHE_BACKEND", default_value = "memory", global = true)]
    cache_backend: String,

    /// Cache connection string. For SQLite a file path or `:memory:`.
    #[arg(long, env = "TAX_CACHE_URL", default_value = ":memory:", global = true)]
    cache_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate the tax owed on a salary.
    Calculate {
        #[arg(long)]
        year: String,
        #[arg(long, allow_hyphen_values = true)]
        salary: String,
    },
    /// Print the bracket table for a year, or `null` when there is none.
    Rates {
        #[arg(long)]
        year: String,
    },
}

impl Cli {
    /// Runs the options through the environment loader's checks.
    fn service_config(&self) -> Result<TaxServiceConfig, tax_core::ConfigError> {
        TaxServiceConfig::from_lookup(|name| {
            EnvVar::from_name(name).and_then(|var| self.setting(var))
        })
    }

    fn setting(
        &self,
        var: EnvVar,
    ) -> Option<String> {
        match var {
            EnvVar::TaxApiBaseUrl => self.tax_api_base_url.clone(),
            EnvVar::TaxApiTimeoutMs => self.tax_api_timeout_ms.clone(),
            EnvVar::TaxApiMaxRetries => self.tax_api_max_retries.clone(),
            EnvVar::TaxApiRetryBackoffMs => self.tax_api_retry_backoff_ms.clone(),
            EnvVar::TaxRateCacheTtlSeconds => self.tax_rate_cache_ttl_seconds.clone(),
        }
    }

    fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            backend: self.cache_backend.clone(),
            connection_string: self.cache_url.clone(),
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    let cli = Cli::parse();
    let config = cli.service_config()?;

    let cache = app::open_cache(&cli.cache_config())
        .await
        .context("Failed to open tax rate cache")?;
    let transport = ReqwestTransport::new().context("Failed to build HTTP client")?;
    let service = TaxService::new(&config, cache, Arc::new(transport));

    debug!(command = ?cli.command, "running command");
    let outcome = match &cli.command {
        Command::Calculate { year, salary } => service
            .calculate(year, salary)
            .await
            .map(|result| serde_json::to_string_pretty(&result)),
        Command::Rates { year } => service
            .rates(year)
            .await
            .map(|rates| serde_json::to_string_pretty(&rates)),
    };

    match outcome {
        Ok(json) => {
            println!("{}", json.context("Failed to encode result")?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let report = ErrorReport::from(&err);
            error!(status = report.status, error = report.error, "{err}");
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tax_core::ConfigError;

    use super::*;

    fn parse(extra: &[&str]) -> Cli {
        let mut args = vec![
            "tax-cli",
            "--tax-api-base-url",
            "https://tax.example.com/",
            "--tax-api-timeout-ms",
            "5000",
            "--tax-api-max-retries",
            "3",
            "--tax-api-retry-backoff-ms",
            "1000",
            "--tax-rate-cache-ttl-seconds",
            "60",
        ];
        // Overrides in `extra` replace the default value of the same flag
        // rather than repeating it (clap rejects a repeated flag).
        for pair in extra.chunks(2) {
            match args.iter().position(|arg| *arg == pair[0]) {
                Some(i) if pair.len() == 2 => args[i + 1] = pair[1],
                _ => args.extend_from_slice(pair),
            }
        }
        args.extend_from_slice(&["rates", "--year", "2022"]);
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn flags_are_loaded_like_environment_variables() {
        let config = parse(&[]).service_config().unwrap();

        assert_eq!(config.tax_api_base_url, "https://tax.example.com");
        assert_eq!(config.tax_api_timeout, Duration::from_millis(5000));
        assert_eq!(config.tax_api_max_retries, 3);
        assert_eq!(config.tax_api_retry_backoff, Duration::from_millis(1000));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn non_numeric_flag_is_reported_under_its_variable_name() {
        let cli = parse(&["--tax-api-timeout-ms", "soon"]);

        assert_eq!(
            cli.service_config(),
            Err(ConfigError::Invalid {
                name: "TAX_API_TIMEOUT_MS",
                value: "soon".to_string(),
            })
        );
    }

    #[test]
    fn zero_attempts_flag_is_rejected() {
        let cli = parse(&["--tax-api-max-retries", "0"]);

        assert_eq!(
            cli.service_config(),
            Err(ConfigError::OutOfRange {
                name: "TAX_API_MAX_RETRIES",
                min: 1,
            })
        );
    }
}
