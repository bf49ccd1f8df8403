use crate::{
  block::{Block, HEAD_FIELD_SIZE, HEADER_SIZE, head},
  error::{ArenaError, Result},
  storage::ArenaStorage,
};

/// A live block as seen while walking the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  pub offset: usize,
  /// `prev` field as stored in the header.
  pub prev: usize,
  /// `next` field as stored in the header.
  pub next: usize,
  pub size: usize,
  /// Free bytes between the previous block (or the head field) and this one.
  pub gap_before: usize,
}

impl BlockInfo {
  pub fn end(&self) -> usize {
    self.offset + self.size
  }

  pub fn payload(&self) -> usize {
    self.offset + HEADER_SIZE
  }

  pub fn payload_len(&self) -> usize {
    self.size - HEADER_SIZE
  }
}

/// Where a new block goes and who it links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
  /// Block in front of the gap, 0 for the head field.
  pub prev: usize,
  pub offset: usize,
  /// Block behind the gap, 0 if the gap runs to the end of the arena.
  pub next: usize,
}

/// Address-ordered walk from the head field along `next` links.
///
/// Every header is checked before it is trusted: the chain must be strictly
/// increasing, non-overlapping and inside the arena, so a header clobbered
/// by a raw fill ends the walk with [`ArenaError::CorruptChain`] instead of
/// looping or reading out of range.
pub struct Blocks<'a> {
  storage: &'a ArenaStorage,
  current: usize,
  prev_end: usize,
  failed: bool,
}

impl<'a> Blocks<'a> {
  pub fn new(storage: &'a ArenaStorage) -> Result<Self> {
    Ok(Self {
      storage,
      current: head(storage)?,
      prev_end: HEAD_FIELD_SIZE,
      failed: false,
    })
  }

  /// End of the last block yielded so far, or of the head field.
  ///
  /// Once the walk is exhausted, everything from here to the arena's end is
  /// the trailing gap.
  pub fn end_of_last(&self) -> usize {
    self.prev_end
  }

  fn step(&mut self) -> Result<BlockInfo> {
    let offset = self.current;
    if offset < self.prev_end {
      return Err(corrupt(offset, "block overlaps its predecessor"));
    }

    let block = Block::at(offset);
    let header = |result: Result<usize>| {
      result.map_err(|_| corrupt(offset, "header lies outside the arena"))
    };
    let next = header(block.next(self.storage))?;
    let prev = header(block.prev(self.storage))?;
    let size = header(block.size(self.storage))?;

    if size < HEADER_SIZE {
      return Err(corrupt(offset, "size is smaller than a header"));
    }
    if offset + size > self.storage.capacity() {
      return Err(corrupt(offset, "block extends past the arena"));
    }

    let info = BlockInfo {
      offset,
      prev,
      next,
      size,
      gap_before: offset - self.prev_end,
    };

    self.prev_end = info.end();
    self.current = next;

    Ok(info)
  }
}

impl Iterator for Blocks<'_> {
  type Item = Result<BlockInfo>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed || self.current == 0 {
      return None;
    }

    let step = self.step();
    self.failed = step.is_err();
    Some(step)
  }
}

fn corrupt(
  offset: usize,
  reason: &'static str,
) -> ArenaError {
  ArenaError::CorruptChain { offset, reason }
}

/// Finds the first gap, in address order, that holds `total` bytes.
///
/// The gap in front of the first block is tried first and the trailing gap
/// last. The block always goes at the very start of the gap.
pub fn first_fit(
  storage: &ArenaStorage,
  total: usize,
) -> Result<Option<Placement>> {
  let mut blocks = Blocks::new(storage)?;
  let mut prev = 0;

  for info in blocks.by_ref() {
    let info = info?;

    if info.gap_before >= total {
      return Ok(Some(Placement {
        prev,
        offset: info.offset - info.gap_before,
        next: info.offset,
      }));
    }

    prev = info.offset;
  }

  let tail = blocks.end_of_last();
  if storage.capacity() - tail >= total {
    return Ok(Some(Placement {
      prev,
      offset: tail,
      next: 0,
    }));
  }

  Ok(None)
}

/// Looks up the live block starting at `offset`.
///
/// The block's stored `prev` must name the block the walk passed just
/// before it (0 for the head field), since unlinking relies on it.
pub fn find(
  storage: &ArenaStorage,
  offset: usize,
) -> Result<Option<BlockInfo>> {
  let mut prev = 0;

  for info in Blocks::new(storage)? {
    let info = info?;

    if info.offset == offset {
      if info.prev != prev {
        return Err(corrupt(offset, "prev link disagrees with chain order"));
      }
      return Ok(Some(info));
    }
    if info.offset > offset {
      break;
    }
    prev = info.offset;
  }

  Ok(None)
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Lays out blocks `(offset, size)` in order, linking them like the
  /// allocator would.
  fn arena_with(
    capacity: usize,
    layout: &[(usize, usize)],
  ) -> ArenaStorage {
    let mut storage = ArenaStorage::create(capacity).unwrap();
    let mut prev = 0;

    for (i, &(offset, size)) in layout.iter().enumerate() {
      let next = layout.get(i + 1).map_or(0, |&(next, _)| next);
      Block::at(offset).write(&mut storage, next, prev, size).unwrap();
      prev = offset;
    }
    storage.write_u32(0, layout.first().map_or(0, |&(offset, _)| offset) as u32).unwrap();

    storage
  }

  #[test]
  fn test_walk_reports_gaps() {
    let storage = arena_with(100, &[(4, 20), (34, 16), (50, 12)]);
    let mut blocks = Blocks::new(&storage).unwrap();

    let gaps: Vec<(usize, usize)> = blocks
      .by_ref()
      .map(|info| info.map(|info| (info.offset, info.gap_before)).unwrap())
      .collect();

    assert_eq!(gaps, vec![(4, 0), (34, 10), (50, 0)]);
    assert_eq!(blocks.end_of_last(), 62);
  }

  #[test]
  fn test_empty_chain() {
    let storage = ArenaStorage::create(64).unwrap();
    let mut blocks = Blocks::new(&storage).unwrap();

    assert!(blocks.next().is_none());
    assert_eq!(blocks.end_of_last(), HEAD_FIELD_SIZE);
  }

  #[test]
  fn test_first_fit_takes_earliest_gap_that_fits() {
    // Gaps: 10 bytes at 24, 50 bytes at 50, 88 bytes of tail at 112.
    let storage = arena_with(200, &[(4, 20), (34, 16), (100, 12)]);

    let small = first_fit(&storage, 8).unwrap().unwrap();
    assert_eq!(small, Placement { prev: 4, offset: 24, next: 34 });

    let medium = first_fit(&storage, 20).unwrap().unwrap();
    assert_eq!(medium, Placement { prev: 34, offset: 50, next: 100 });

    let tail = first_fit(&storage, 51).unwrap().unwrap();
    assert_eq!(tail, Placement { prev: 100, offset: 112, next: 0 });

    assert_eq!(first_fit(&storage, 89).unwrap(), None);
  }

  #[test]
  fn test_first_fit_uses_gap_before_first_block() {
    let storage = arena_with(64, &[(30, 12)]);

    let placement = first_fit(&storage, 26).unwrap().unwrap();

    assert_eq!(placement, Placement { prev: 0, offset: 4, next: 30 });
  }

  #[test]
  fn test_find() {
    let storage = arena_with(100, &[(4, 20), (34, 16)]);

    assert_eq!(find(&storage, 34).unwrap().map(|info| info.size), Some(16));
    assert_eq!(find(&storage, 24).unwrap(), None);
    assert_eq!(find(&storage, 90).unwrap(), None);
  }

  #[test]
  fn test_find_rejects_stale_prev_link() {
    let mut storage = arena_with(100, &[(4, 20), (34, 16)]);
    Block::at(34).set_prev(&mut storage, 0).unwrap();

    assert_eq!(find(&storage, 4).unwrap().map(|info| info.prev), Some(0));
    assert!(matches!(
      find(&storage, 34),
      Err(ArenaError::CorruptChain { offset: 34, .. })
    ));
  }

  #[test]
  fn test_backward_link_is_corruption() {
    let mut storage = arena_with(100, &[(4, 20), (34, 16)]);
    Block::at(34).set_next(&mut storage, 4).unwrap();

    let results: Vec<_> = Blocks::new(&storage).unwrap().collect();

    assert_eq!(results.len(), 3);
    assert!(matches!(
      results[2],
      Err(ArenaError::CorruptChain { offset: 4, .. })
    ));
  }

  #[test]
  fn test_oversized_block_is_corruption() {
    let mut storage = arena_with(64, &[(4, 20)]);
    Block::at(4).set_size(&mut storage, 200).unwrap();

    assert!(matches!(
      first_fit(&storage, 12),
      Err(ArenaError::CorruptChain { offset: 4, .. })
    ));
  }
}
