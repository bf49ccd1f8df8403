use crate::{error::Result, storage::ArenaStorage};

/// Bytes reserved at offset 0 for the head field.
pub const HEAD_FIELD_SIZE: usize = 4;

/// Bytes of metadata in front of every payload.
pub const HEADER_SIZE: usize = 12;

/// Requests with `payload + RESERVED_MARGIN >= capacity` are refused up front.
pub const RESERVED_MARGIN: usize = 16;

const NEXT: usize = 0;
const PREV: usize = 4;
const SIZE: usize = 8;

/// Header of an allocated block, addressed by the offset of its first byte.
///
/// ```text
///   offset      +4          +8          +12
///   ┌───────────┬───────────┬───────────┬──────────────────────┐
///   │   next    │   prev    │   size    │       payload        │
///   └───────────┴───────────┴───────────┴──────────────────────┘
///                                        ▲
///                                        └── handle returned to callers
/// ```
///
/// `size` counts the header too. A `next` or `prev` of 0 means "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
  pub offset: usize,
}

impl Block {
  pub fn at(offset: usize) -> Self {
    Self { offset }
  }

  /// The block whose payload starts at `handle`, if `handle` can be one.
  pub fn from_payload(handle: usize) -> Option<Self> {
    handle
      .checked_sub(HEADER_SIZE)
      .filter(|&offset| offset >= HEAD_FIELD_SIZE)
      .map(Self::at)
  }

  pub fn payload(&self) -> usize {
    self.offset + HEADER_SIZE
  }

  pub fn next(
    &self,
    storage: &ArenaStorage,
  ) -> Result<usize> {
    Ok(storage.read_u32(self.offset + NEXT)? as usize)
  }

  pub fn set_next(
    &self,
    storage: &mut ArenaStorage,
    next: usize,
  ) -> Result<()> {
    storage.write_u32(self.offset + NEXT, next as u32)
  }

  pub fn prev(
    &self,
    storage: &ArenaStorage,
  ) -> Result<usize> {
    Ok(storage.read_u32(self.offset + PREV)? as usize)
  }

  pub fn set_prev(
    &self,
    storage: &mut ArenaStorage,
    prev: usize,
  ) -> Result<()> {
    storage.write_u32(self.offset + PREV, prev as u32)
  }

  pub fn size(
    &self,
    storage: &ArenaStorage,
  ) -> Result<usize> {
    Ok(storage.read_u32(self.offset + SIZE)? as usize)
  }

  pub fn set_size(
    &self,
    storage: &mut ArenaStorage,
    size: usize,
  ) -> Result<()> {
    storage.write_u32(self.offset + SIZE, size as u32)
  }

  /// Writes all three fields at once.
  pub fn write(
    &self,
    storage: &mut ArenaStorage,
    next: usize,
    prev: usize,
    size: usize,
  ) -> Result<()> {
    self.set_next(storage, next)?;
    self.set_prev(storage, prev)?;
    self.set_size(storage, size)
  }
}

/// Offset of the first block, or 0 when nothing is allocated.
pub fn head(storage: &ArenaStorage) -> Result<usize> {
  Ok(storage.read_u32(0)? as usize)
}

/// Points the `next` link of `prev` at `target`.
///
/// A `prev` of 0 stands for the head field.
pub fn link_next(
  storage: &mut ArenaStorage,
  prev: usize,
  target: usize,
) -> Result<()> {
  if prev == 0 {
    storage.write_u32(0, target as u32)
  } else {
    Block::at(prev).set_next(storage, target)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fields_round_trip_at_fixed_offsets() {
    let mut storage = ArenaStorage::create(64).unwrap();
    let block = Block::at(20);

    block.write(&mut storage, 40, 4, 18).unwrap();

    assert_eq!(block.next(&storage).unwrap(), 40);
    assert_eq!(block.prev(&storage).unwrap(), 4);
    assert_eq!(block.size(&storage).unwrap(), 18);
    assert_eq!(storage.read_u32(20).unwrap(), 40);
    assert_eq!(storage.read_u32(24).unwrap(), 4);
    assert_eq!(storage.read_u32(28).unwrap(), 18);
    assert_eq!(block.payload(), 32);
  }

  #[test]
  fn test_header_past_capacity_fails() {
    let mut storage = ArenaStorage::create(24).unwrap();
    let block = Block::at(16);

    assert!(block.set_next(&mut storage, 0).is_ok());
    assert!(block.set_prev(&mut storage, 0).is_ok());
    assert!(block.size(&storage).is_err());
    assert!(block.set_size(&mut storage, 12).is_err());
  }

  #[test]
  fn test_from_payload() {
    assert_eq!(Block::from_payload(16), Some(Block::at(4)));
    assert_eq!(Block::from_payload(15), None);
    assert_eq!(Block::from_payload(3), None);
  }

  #[test]
  fn test_link_next_of_zero_targets_head_field() {
    let mut storage = ArenaStorage::create(64).unwrap();
    Block::at(4).write(&mut storage, 0, 0, 20).unwrap();

    link_next(&mut storage, 0, 4).unwrap();
    assert_eq!(head(&storage).unwrap(), 4);

    link_next(&mut storage, 4, 30).unwrap();
    assert_eq!(Block::at(4).next(&storage).unwrap(), 30);
    assert_eq!(head(&storage).unwrap(), 4);
  }
}
