//! certvet - TLS certificate validation CLI
//!
//! Validate certificates from live hosts or local files.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    certvet_cli::run().await
}
