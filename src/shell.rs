use std::io::{BufRead, Write};

use crate::{
  command::{Command, Report},
  config::ShellConfig,
  error::{CommandError, ShellError},
  heap::HeapArena,
};

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Terminate,
}

/// Line-oriented command loop owning the single arena.
///
/// Results go to `out`. Failed commands are reported on `err` as
/// `[ERROR] <message>` and the loop carries on.
pub struct Shell {
  config: ShellConfig,
  arena: Option<HeapArena>,
}

impl Shell {
  pub fn new(config: ShellConfig) -> Self {
    Self { config, arena: None }
  }

  pub fn arena(&self) -> Option<&HeapArena> {
    self.arena.as_ref()
  }

  /// Runs until `FINALIZE` or end of input. Only I/O failures abort.
  pub fn run<R, W, E>(
    &mut self,
    mut input: R,
    out: &mut W,
    err: &mut E,
  ) -> Result<(), ShellError>
  where
    R: BufRead,
    W: Write,
    E: Write,
  {
    let mut buf = Vec::new();

    loop {
      buf.clear();
      if input.read_until(b'\n', &mut buf)? == 0 {
        break;
      }
      let raw = buf.strip_suffix(b"\n").unwrap_or(&buf[..]);
      let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

      let result = match std::str::from_utf8(raw) {
        Ok(line) => self.execute_line(line, out),
        Err(_) => Err(CommandError::InvalidEncoding.into()),
      };

      match result {
        Ok(Flow::Continue) => {}
        Ok(Flow::Terminate) => return Ok(()),
        Err(ShellError::Io(error)) => return Err(ShellError::Io(error)),
        Err(error) => {
          let line = String::from_utf8_lossy(raw);
          tracing::warn!(%error, line = %line, "command failed");
          writeln!(err, "[ERROR] {error}")?;
        }
      }
    }

    if let Some(arena) = self.arena.take() {
      arena.destroy();
    }

    Ok(())
  }

  pub fn execute_line<W: Write>(
    &mut self,
    line: &str,
    out: &mut W,
  ) -> Result<Flow, ShellError> {
    if line.len() > self.config.max_line_len {
      return Err(
        CommandError::LineTooLong {
          len: line.len(),
          max: self.config.max_line_len,
        }
        .into(),
      );
    }

    match Command::parse(line, self.config.max_tokens)? {
      Some(command) => self.execute(command, out),
      None => Ok(Flow::Continue),
    }
  }

  pub fn execute<W: Write>(
    &mut self,
    command: Command,
    out: &mut W,
  ) -> Result<Flow, ShellError> {
    tracing::debug!(?command, "executing");

    match command {
      Command::Initialize { capacity } => {
        let arena = HeapArena::create(capacity)?;
        if let Some(previous) = self.arena.replace(arena) {
          tracing::warn!("arena re-initialized, previous arena released");
          previous.destroy();
        }
      }
      Command::Finalize => {
        if let Some(arena) = self.arena.take() {
          arena.destroy();
        }
        return Ok(Flow::Terminate);
      }
      Command::Dump => writeln!(out, "{}", self.active()?.dump())?,
      Command::Alloc { size } => {
        let handle = self.active_mut()?.allocate(size)?;
        writeln!(out, "{}", handle.unwrap_or(0))?;
      }
      Command::Free { handle } => self.active_mut()?.free(handle)?,
      Command::Fill { offset, len, value } => {
        // Only the low byte lands in the arena.
        self.active_mut()?.fill(offset, len, value as u8)?;
      }
      Command::Show(Report::Free) => writeln!(out, "{}", self.active()?.free_summary()?)?,
      Command::Show(Report::Usage) => writeln!(out, "{}", self.active()?.usage_summary()?)?,
      Command::Show(Report::Allocations) => writeln!(out, "{}", self.active()?.block_map()?)?,
      Command::AllocAligned => return Err(ShellError::NotImplemented("ALLOCALIGNED")),
      Command::Realloc => return Err(ShellError::NotImplemented("REALLOC")),
    }

    Ok(Flow::Continue)
  }

  fn active(&self) -> Result<&HeapArena, ShellError> {
    self.arena.as_ref().ok_or(ShellError::NotInitialized)
  }

  fn active_mut(&mut self) -> Result<&mut HeapArena, ShellError> {
    self.arena.as_mut().ok_or(ShellError::NotInitialized)
  }
}
