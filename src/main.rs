//! layered-config: inspect a resolved layered configuration
//!
//! Resolves the built-in modules for an instance and prints the result as
//! documentation, JSON, or log lines.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
