//! Inspection reports. Each `Display` impl renders the exact text the
//! command shell prints.

use std::fmt;

/// Free gaps and the bytes not consumed by the head field or any block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeSummary {
  pub free_gaps: usize,
  pub free_bytes: usize,
}

impl fmt::Display for FreeSummary {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{} blocks ({} bytes) free", self.free_gaps, self.free_bytes)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSummary {
  pub blocks: usize,
  /// Payload bytes only.
  pub used_bytes: usize,
  /// Head field plus every block, headers included.
  pub consumed_bytes: usize,
  pub free_gaps: usize,
}

impl UsageSummary {
  /// Payload share of all consumed bytes, in whole percent.
  pub fn efficiency(&self) -> usize {
    100 * self.used_bytes / self.consumed_bytes
  }

  /// `100 * (free_gaps - 1) / blocks`, or 0 with no blocks.
  ///
  /// This counts gaps against blocks and says nothing about how the free
  /// bytes are spread. A fully packed arena has no gaps and reports a
  /// negative value; the division truncates toward zero.
  pub fn fragmentation(&self) -> i64 {
    if self.blocks == 0 {
      return 0;
    }
    100 * (self.free_gaps as i64 - 1) / self.blocks as i64
  }
}

impl fmt::Display for UsageSummary {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "{} blocks ({} bytes) used", self.blocks, self.used_bytes)?;
    writeln!(f, "{}% efficiency", self.efficiency())?;
    write!(f, "{}% fragmentation", self.fragmentation())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
  Occupied(usize),
  Free(usize),
}

/// Every region of the arena in address order, starting with the head field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMap {
  pub regions: Vec<Region>,
}

impl BlockMap {
  pub fn occupied_bytes(&self) -> usize {
    self
      .regions
      .iter()
      .map(|region| match region {
        Region::Occupied(size) => *size,
        Region::Free(_) => 0,
      })
      .sum()
  }

  pub fn free_bytes(&self) -> usize {
    self
      .regions
      .iter()
      .map(|region| match region {
        Region::Free(size) => *size,
        Region::Occupied(_) => 0,
      })
      .sum()
  }
}

impl fmt::Display for BlockMap {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    for (i, region) in self.regions.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      match region {
        Region::Occupied(size) => write!(f, "OCCUPIED {size} bytes")?,
        Region::Free(size) => write!(f, "FREE {size} bytes")?,
      }
    }
    Ok(())
  }
}

/// Hex view of the raw arena bytes.
///
/// Sixteen bytes per line behind an `%08X` offset label, with an extra
/// space every eight bytes, and the capacity as a closing label:
///
/// ```text
///
/// 00000000	04 00 00 00 00 00 00 00  00 00 00 00 14 00 00 00
/// 00000010	2A 2A 2A 2A 00 00 00 00  00 00 00 00 00 00 00 00
/// 00000020
/// ```
pub struct HexDump<'a> {
  bytes: &'a [u8],
}

impl<'a> HexDump<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Self { bytes }
  }
}

impl fmt::Display for HexDump<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    for (index, byte) in self.bytes.iter().enumerate() {
      if index % 8 == 0 {
        write!(f, " ")?;
      }
      if index % 16 == 0 {
        write!(f, "\n{index:08X}\t")?;
      }
      write!(f, "{byte:02X} ")?;
    }
    write!(f, "\n{:08X}", self.bytes.len())
  }
}
