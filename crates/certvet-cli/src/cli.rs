//! CLI argument parsing and the run loop.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use certvet::{RuleConfig, Severity, Status, Validator};

use crate::output::{render, OutputFormat};

/// Validate TLS certificates from hosts or files
///
/// Each location is an https:// URL, a path to a PEM/DER certificate
/// file, or a bare hostname (checked on port 443). All locations are
/// checked concurrently; results come back in the order given.
#[derive(Parser, Debug)]
#[command(name = "certvet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Locations to validate (URL, file path, or hostname)
    #[arg(required = true)]
    pub locations: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Connection timeout in seconds for network checks
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Warn when the certificate expires within this many days
    #[arg(long, default_value = "14")]
    pub expiry_days: i64,

    /// Severity for the expiration rule
    #[arg(long, value_enum, default_value_t = LevelArg::Warning)]
    pub expiration_level: LevelArg,

    /// Disable the expiration rule
    #[arg(long)]
    pub no_expiration: bool,

    /// Disable OCSP revocation checking
    #[arg(long)]
    pub no_ocsp: bool,

    /// Disable the TLS version rule
    #[arg(long)]
    pub no_tls_check: bool,

    /// Severity when OCSP reports the certificate revoked
    #[arg(long, value_enum, default_value_t = LevelArg::Error)]
    pub ocsp_level: LevelArg,

    /// Severity when the OCSP query itself fails
    #[arg(long, value_enum, default_value_t = LevelArg::Info)]
    pub ocsp_failure_level: LevelArg,

    /// Severity for the TLS version rule
    #[arg(long, value_enum, default_value_t = LevelArg::Warning)]
    pub tls_level: LevelArg,

    /// Exit non-zero when any verdict carries warnings
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Increase verbosity
    #[arg(short, long)]
    pub verbose: bool,
}

/// Finding severity, as written on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LevelArg {
    Error,
    Warning,
    Info,
}

impl From<LevelArg> for Severity {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Error => Self::Error,
            LevelArg::Warning => Self::Warning,
            LevelArg::Info => Self::Info,
        }
    }
}

impl Cli {
    /// Assemble the rule configuration from the flags.
    #[must_use]
    pub fn rule_config(&self) -> RuleConfig {
        let mut config = RuleConfig::default();
        config.expiration.enabled = !self.no_expiration;
        config.expiration.days = self.expiry_days;
        config.expiration.level = self.expiration_level.into();
        config.ocsp.enabled = !self.no_ocsp;
        config.ocsp.level = self.ocsp_level.into();
        config.ocsp.failure_level = self.ocsp_failure_level.into();
        config.tls.enabled = !self.no_tls_check;
        config.tls.level = self.tls_level.into();
        config
    }
}

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("certvet=debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let validator = Validator::new(cli.rule_config())
        .with_timeout(Duration::from_secs(cli.timeout));
    let verdicts = validator.validate_all(&cli.locations).await;

    render(&verdicts, cli.output)?;

    let failed = verdicts.iter().any(|v| {
        v.status == Status::Invalid
            || (cli.fail_on_warnings && v.status == Status::Warning)
    });
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
