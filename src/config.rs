/// Environment variable holding the `tracing` filter for the binary.
pub const LOG_ENV: &str = "RHEAP_LOG";

const MAX_LINE_ENV: &str = "RHEAP_MAX_LINE";
const MAX_TOKENS_ENV: &str = "RHEAP_MAX_TOKENS";

/// Limits and logging defaults for the command shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
  /// Tokens allowed on one line, command keyword included.
  pub max_tokens: usize,
  /// Longest accepted input line in bytes.
  pub max_line_len: usize,
  /// Filter used when `RHEAP_LOG` is unset.
  pub log_directive: String,
}

impl Default for ShellConfig {
  fn default() -> Self {
    Self {
      max_tokens: 10,
      max_line_len: 1000,
      log_directive: "warn".to_string(),
    }
  }
}

impl ShellConfig {
  /// Defaults, overridden by `RHEAP_MAX_LINE` and `RHEAP_MAX_TOKENS`.
  pub fn from_env() -> Self {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let mut config = Self::default();

    if let Some(len) = positive(MAX_LINE_ENV, lookup(MAX_LINE_ENV)) {
      config.max_line_len = len;
    }
    if let Some(tokens) = positive(MAX_TOKENS_ENV, lookup(MAX_TOKENS_ENV)) {
      config.max_tokens = tokens;
    }

    config
  }

  pub fn with_max_tokens(
    mut self,
    max_tokens: usize,
  ) -> Self {
    self.max_tokens = max_tokens;
    self
  }

  pub fn with_max_line_len(
    mut self,
    max_line_len: usize,
  ) -> Self {
    self.max_line_len = max_line_len;
    self
  }

  pub fn with_log_directive(
    mut self,
    directive: impl Into<String>,
  ) -> Self {
    self.log_directive = directive.into();
    self
  }
}

fn positive(
  name: &str,
  raw: Option<String>,
) -> Option<usize> {
  let raw = raw?;
  match raw.trim().parse::<usize>() {
    Ok(value) if value > 0 => Some(value),
    _ => {
      tracing::warn!(variable = name, value = %raw, "ignoring invalid setting");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
      .iter()
      .map(|(name, value)| (name.to_string(), value.to_string()))
      .collect();
    move |name| vars.get(name).cloned()
  }

  #[test]
  fn test_defaults() {
    let config = ShellConfig::default();

    assert_eq!(config.max_tokens, 10);
    assert_eq!(config.max_line_len, 1000);
    assert_eq!(config.log_directive, "warn");
  }

  #[test]
  fn test_builders() {
    let config = ShellConfig::default()
      .with_max_tokens(4)
      .with_max_line_len(80)
      .with_log_directive("rheap=debug");

    assert_eq!(config.max_tokens, 4);
    assert_eq!(config.max_line_len, 80);
    assert_eq!(config.log_directive, "rheap=debug");
  }

  #[test]
  fn test_from_env_overrides_limits() {
    let config = ShellConfig::from_lookup(lookup_in(&[
      (MAX_LINE_ENV, "80"),
      (MAX_TOKENS_ENV, " 3 "),
    ]));

    assert_eq!(config.max_line_len, 80);
    assert_eq!(config.max_tokens, 3);
    assert_eq!(config.log_directive, "warn");
  }

  #[test]
  fn test_from_env_ignores_invalid_values() {
    let config = ShellConfig::from_lookup(lookup_in(&[
      (MAX_LINE_ENV, "0"),
      (MAX_TOKENS_ENV, "many"),
    ]));

    assert_eq!(config, ShellConfig::default());
  }

  #[test]
  fn test_from_env_without_overrides_is_default() {
    assert_eq!(ShellConfig::from_lookup(lookup_in(&[])), ShellConfig::default());
  }
}
