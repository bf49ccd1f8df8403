//! Error types for the arena, the command parser and the shell.

use std::io;

use thiserror::Error;

/// Errors raised by the arena core.
///
/// Running out of space is not an error: [`crate::HeapArena::allocate`]
/// reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ArenaError {
  /// The requested capacity cannot hold the head field or does not fit
  /// in a 4-byte header field.
  #[error("invalid arena capacity {requested}")]
  Capacity { requested: usize },

  /// The OS refused to map the arena bytes.
  #[error("failed to map arena: {0}")]
  Map(#[source] io::Error),

  /// A raw access touched bytes past the end of the arena.
  #[error("access of {len} bytes at offset {offset} exceeds arena capacity {capacity}")]
  OutOfBounds {
    offset: usize,
    len: usize,
    capacity: usize,
  },

  /// `free` was called with an offset that is not a live payload start.
  #[error("offset {handle} is not a live allocation")]
  InvalidHandle { handle: usize },

  /// A header reachable from the head field is inconsistent.
  #[error("corrupt block chain at offset {offset}: {reason}")]
  CorruptChain { offset: usize, reason: &'static str },
}

/// Errors raised while turning an input line into a [`crate::Command`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
  #[error("unknown command ({0})")]
  Unknown(String),

  #[error("{command} expects argument #{position}")]
  MissingArgument {
    command: &'static str,
    position: usize,
  },

  #[error("invalid number ({0})")]
  InvalidNumber(String),

  #[error("too many tokens ({count}, at most {max})")]
  TooManyTokens { count: usize, max: usize },

  #[error("line too long ({len} bytes, at most {max})")]
  LineTooLong { len: usize, max: usize },

  #[error("line is not valid UTF-8")]
  InvalidEncoding,
}

/// Errors reported by the [`crate::Shell`] for a single command.
#[derive(Debug, Error)]
pub enum ShellError {
  #[error(transparent)]
  Command(#[from] CommandError),

  #[error(transparent)]
  Arena(#[from] ArenaError),

  #[error("arena is not initialized")]
  NotInitialized,

  #[error("{0} is not implemented")]
  NotImplemented(&'static str),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),
}

/// Result type for arena operations.
pub type Result<T> = std::result::Result<T, ArenaError>;
