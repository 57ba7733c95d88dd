//! Output rendering for verdicts.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;

use certvet::{Status, Verdict};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored per-location summary
    #[default]
    Pretty,
    /// JSON array of verdicts
    Json,
}

/// Render every verdict in the selected format.
pub fn render(verdicts: &[Verdict], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(verdicts)?);
        }
        OutputFormat::Pretty => {
            for verdict in verdicts {
                print_verdict(verdict);
            }
            print_summary(verdicts);
        }
    }
    Ok(())
}

fn print_verdict(verdict: &Verdict) {
    let tag = match verdict.status {
        Status::Ok => "  OK   ".bright_green(),
        Status::Warning => "  WARN ".bright_yellow(),
        Status::Invalid => " INVALID".bright_red(),
    };
    println!("{} {}", tag, verdict.location.bright_white());

    if let Some(cname) = &verdict.cname {
        let issuer = verdict.issuer.as_deref().unwrap_or("unknown issuer");
        println!("         {} issued by {}", cname.dimmed(), issuer.dimmed());
    }
    if verdict.valid_to.is_some() {
        let days = verdict.days_remaining;
        let expiry = if days < 0 {
            format!("expired {} days ago", -days).bright_red()
        } else {
            format!("{days} days remaining").dimmed()
        };
        println!("         {expiry}");
    }
    if let Some(cipher) = &verdict.cipher {
        println!(
            "         {} {}",
            cipher.protocol.dimmed(),
            cipher.name.dimmed()
        );
    }
    if let Some(ocsp) = verdict.ocsp {
        println!("         {}", format!("ocsp: {ocsp:?}").to_lowercase().dimmed());
    }

    for error in &verdict.errors {
        println!("         {} {}", "✗".bright_red(), error.bright_red());
    }
    for warning in &verdict.warnings {
        println!("         {} {}", "!".bright_yellow(), warning.bright_yellow());
    }
    for note in &verdict.info {
        println!("         {} {}", "·".dimmed(), note.dimmed());
    }
    println!();
}

fn print_summary(verdicts: &[Verdict]) {
    let ok = verdicts.iter().filter(|v| v.status == Status::Ok).count();
    let warn = verdicts
        .iter()
        .filter(|v| v.status == Status::Warning)
        .count();
    let invalid = verdicts
        .iter()
        .filter(|v| v.status == Status::Invalid)
        .count();

    println!(
        "  {} checked: {} ok, {} warnings, {} invalid",
        verdicts.len().to_string().bright_white(),
        ok.to_string().bright_green(),
        warn.to_string().bright_yellow(),
        invalid.to_string().bright_red()
    );
}
