//! `rheap` command shell.
//!
//! Reads one command per line from stdin, prints results on stdout and
//! errors on stderr. Logging goes to stderr and is filtered by `RHEAP_LOG`.

use std::io;

use rheap::{Shell, ShellConfig, config::LOG_ENV};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
  let config = ShellConfig::from_env();
  let filter = match EnvFilter::try_from_env(LOG_ENV) {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(&config.log_directive)?,
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();

  let stdin = io::stdin().lock();
  let mut stdout = io::stdout().lock();
  let mut stderr = io::stderr().lock();

  Shell::new(config).run(stdin, &mut stdout, &mut stderr)?;

  Ok(())
}
