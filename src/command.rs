use crate::error::CommandError;

/// Which inspection report `SHOW` asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
  Free,
  Usage,
  Allocations,
}

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Initialize { capacity: usize },
  Finalize,
  Dump,
  Alloc { size: usize },
  Free { handle: usize },
  Fill { offset: usize, len: usize, value: usize },
  Show(Report),
  AllocAligned,
  Realloc,
}

impl Command {
  /// Parses one line. Blank lines yield `Ok(None)`.
  ///
  /// Arguments past the ones a command uses are ignored.
  pub fn parse(
    line: &str,
    max_tokens: usize,
  ) -> Result<Option<Self>, CommandError> {
    let tokens: Vec<&str> = line.split_ascii_whitespace().collect();
    if tokens.len() > max_tokens {
      return Err(CommandError::TooManyTokens {
        count: tokens.len(),
        max: max_tokens,
      });
    }

    let Some((&keyword, args)) = tokens.split_first() else {
      return Ok(None);
    };
    let arg = |command: &'static str, position: usize| -> Result<usize, CommandError> {
      let token = args
        .get(position - 1)
        .ok_or(CommandError::MissingArgument { command, position })?;
      parse_number(token)
    };

    let command = match keyword {
      "INITIALIZE" => Self::Initialize {
        capacity: arg("INITIALIZE", 1)?,
      },
      "FINALIZE" => Self::Finalize,
      "DUMP" => Self::Dump,
      "ALLOC" => Self::Alloc {
        size: arg("ALLOC", 1)?,
      },
      "FREE" => Self::Free {
        handle: arg("FREE", 1)?,
      },
      "FILL" => Self::Fill {
        offset: arg("FILL", 1)?,
        len: arg("FILL", 2)?,
        value: arg("FILL", 3)?,
      },
      "SHOW" => match args.first() {
        Some(&"FREE") => Self::Show(Report::Free),
        Some(&"USAGE") => Self::Show(Report::Usage),
        Some(&"ALLOCATIONS") => Self::Show(Report::Allocations),
        Some(other) => return Err(CommandError::Unknown(format!("SHOW {other}"))),
        None => {
          return Err(CommandError::MissingArgument {
            command: "SHOW",
            position: 1,
          });
        }
      },
      "ALLOCALIGNED" => Self::AllocAligned,
      "REALLOC" => Self::Realloc,
      other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
  }
}

/// Unsigned decimal, digits only.
fn parse_number(token: &str) -> Result<usize, CommandError> {
  if token.is_empty() || !token.bytes().all(|byte| byte.is_ascii_digit()) {
    return Err(CommandError::InvalidNumber(token.to_string()));
  }
  token
    .parse()
    .map_err(|_| CommandError::InvalidNumber(token.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    Command::parse(line, 10)
  }

  #[test]
  fn test_parse_vocabulary() {
    assert_eq!(parse("INITIALIZE 100"), Ok(Some(Command::Initialize { capacity: 100 })));
    assert_eq!(parse("FINALIZE"), Ok(Some(Command::Finalize)));
    assert_eq!(parse("DUMP"), Ok(Some(Command::Dump)));
    assert_eq!(parse("ALLOC 8"), Ok(Some(Command::Alloc { size: 8 })));
    assert_eq!(parse("FREE 16"), Ok(Some(Command::Free { handle: 16 })));
    assert_eq!(
      parse("FILL 16 8 42"),
      Ok(Some(Command::Fill { offset: 16, len: 8, value: 42 }))
    );
    assert_eq!(parse("SHOW FREE"), Ok(Some(Command::Show(Report::Free))));
    assert_eq!(parse("SHOW USAGE"), Ok(Some(Command::Show(Report::Usage))));
    assert_eq!(parse("SHOW ALLOCATIONS"), Ok(Some(Command::Show(Report::Allocations))));
    assert_eq!(parse("ALLOCALIGNED 8 4"), Ok(Some(Command::AllocAligned)));
    assert_eq!(parse("REALLOC 16 8"), Ok(Some(Command::Realloc)));
  }

  #[test]
  fn test_whitespace_and_blank_lines() {
    assert_eq!(parse(""), Ok(None));
    assert_eq!(parse("   \t "), Ok(None));
    assert_eq!(parse("  ALLOC\t 12  "), Ok(Some(Command::Alloc { size: 12 })));
    assert_eq!(parse("ALLOC 12 extra"), Ok(Some(Command::Alloc { size: 12 })));
  }

  #[test]
  fn test_unknown_commands() {
    assert_eq!(parse("alloc 8"), Err(CommandError::Unknown("alloc".to_string())));
    assert_eq!(parse("SHOW MAP"), Err(CommandError::Unknown("SHOW MAP".to_string())));
    assert_eq!(
      parse("SHOW"),
      Err(CommandError::MissingArgument { command: "SHOW", position: 1 })
    );
  }

  #[test]
  fn test_numbers_are_unsigned_decimal() {
    assert_eq!(parse("ALLOC -1"), Err(CommandError::InvalidNumber("-1".to_string())));
    assert_eq!(parse("ALLOC +1"), Err(CommandError::InvalidNumber("+1".to_string())));
    assert_eq!(parse("ALLOC 0x10"), Err(CommandError::InvalidNumber("0x10".to_string())));
    assert!(matches!(
      parse("ALLOC 99999999999999999999999"),
      Err(CommandError::InvalidNumber(_))
    ));
    assert_eq!(
      parse("FILL 16 8"),
      Err(CommandError::MissingArgument { command: "FILL", position: 3 })
    );
  }

  #[test]
  fn test_token_limit() {
    assert_eq!(
      Command::parse("FILL 1 2 3", 3),
      Err(CommandError::TooManyTokens { count: 4, max: 3 })
    );
    assert!(Command::parse("FILL 1 2 3", 4).is_ok());
  }
}
