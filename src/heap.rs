use crate::{
  block::{self, Block, HEAD_FIELD_SIZE, HEADER_SIZE, RESERVED_MARGIN},
  error::{ArenaError, Result},
  report::{BlockMap, FreeSummary, HexDump, Region, UsageSummary},
  storage::ArenaStorage,
  walker::{self, BlockInfo, Blocks},
};

/// First-fit heap living entirely inside one fixed-size byte arena.
///
/// All allocator state is in the arena bytes themselves: the head field at
/// offset 0 and the headers of the live blocks. Free space is whatever lies
/// between blocks and is recomputed on every walk.
pub struct HeapArena {
  storage: ArenaStorage,
}

impl HeapArena {
  pub fn create(capacity: usize) -> Result<Self> {
    let storage = ArenaStorage::create(capacity)?;
    tracing::info!(capacity, "arena created");

    Ok(Self { storage })
  }

  /// Releases the arena. Handles handed out so far die with it.
  pub fn destroy(self) {
    tracing::info!(capacity = self.capacity(), "arena released");
  }

  pub fn capacity(&self) -> usize {
    self.storage.capacity()
  }

  pub fn bytes(&self) -> &[u8] {
    self.storage.as_bytes()
  }

  pub fn read_u32(
    &self,
    offset: usize,
  ) -> Result<u32> {
    self.storage.read_u32(offset)
  }

  /// Offset of the first block's header, 0 when empty.
  pub fn head(&self) -> Result<usize> {
    block::head(&self.storage)
  }

  /// Live blocks in address order.
  pub fn blocks(&self) -> Result<Blocks<'_>> {
    Blocks::new(&self.storage)
  }

  /// Reserves `payload_len` bytes and returns the payload offset.
  ///
  /// Returns `Ok(None)` when no gap is large enough. Requests where
  /// `payload_len + 16 >= capacity` are refused without searching; this
  /// keeps a margin even when a tighter fit would exist.
  pub fn allocate(
    &mut self,
    payload_len: usize,
  ) -> Result<Option<usize>> {
    let capacity = self.capacity();
    if payload_len.saturating_add(RESERVED_MARGIN) >= capacity {
      tracing::debug!(payload_len, capacity, "request exceeds arena margin");
      return Ok(None);
    }

    let total = payload_len + HEADER_SIZE;
    let Some(placement) = walker::first_fit(&self.storage, total)? else {
      tracing::debug!(payload_len, "no gap large enough");
      return Ok(None);
    };

    Block::at(placement.offset).write(&mut self.storage, placement.next, placement.prev, total)?;
    block::link_next(&mut self.storage, placement.prev, placement.offset)?;
    if placement.next != 0 {
      Block::at(placement.next).set_prev(&mut self.storage, placement.offset)?;
    }

    tracing::debug!(
      offset = placement.offset,
      prev = placement.prev,
      next = placement.next,
      size = total,
      "block placed"
    );

    Ok(Some(Block::at(placement.offset).payload()))
  }

  /// Unlinks the block whose payload starts at `handle`.
  ///
  /// The handle is checked against the chain first; an offset that is not
  /// a live payload start is rejected and nothing changes. The freed bytes
  /// are left as they are.
  pub fn free(
    &mut self,
    handle: usize,
  ) -> Result<()> {
    let invalid = ArenaError::InvalidHandle { handle };
    let Some(block) = Block::from_payload(handle) else {
      tracing::warn!(handle, "free of impossible handle");
      return Err(invalid);
    };
    let Some(info) = walker::find(&self.storage, block.offset)? else {
      tracing::warn!(handle, "free of handle that is not live");
      return Err(invalid);
    };

    block::link_next(&mut self.storage, info.prev, info.next)?;
    if info.next != 0 {
      Block::at(info.next).set_prev(&mut self.storage, info.prev)?;
    }

    tracing::debug!(offset = info.offset, size = info.size, "block unlinked");

    Ok(())
  }

  /// Raw memset of `len` bytes at `offset`.
  ///
  /// Only the arena bounds are checked. Filling over a header is allowed and
  /// will be reported as a corrupt chain by the next walk.
  pub fn fill(
    &mut self,
    offset: usize,
    len: usize,
    value: u8,
  ) -> Result<()> {
    self.storage.fill(offset, len, value)?;
    tracing::debug!(offset, len, value, "filled");

    Ok(())
  }

  pub fn free_summary(&self) -> Result<FreeSummary> {
    let mut blocks = self.blocks()?;
    let mut consumed = HEAD_FIELD_SIZE;
    let mut free_gaps = 0;

    for info in blocks.by_ref() {
      let info = info?;
      if info.gap_before > 0 {
        free_gaps += 1;
      }
      consumed += info.size;
    }
    if blocks.end_of_last() < self.capacity() {
      free_gaps += 1;
    }

    Ok(FreeSummary {
      free_gaps,
      free_bytes: self.capacity() - consumed,
    })
  }

  pub fn usage_summary(&self) -> Result<UsageSummary> {
    let mut blocks = self.blocks()?;
    let mut summary = UsageSummary {
      blocks: 0,
      used_bytes: 0,
      consumed_bytes: HEAD_FIELD_SIZE,
      free_gaps: 0,
    };

    for info in blocks.by_ref() {
      let info = info?;
      if info.gap_before > 0 {
        summary.free_gaps += 1;
      }
      summary.blocks += 1;
      summary.used_bytes += info.payload_len();
      summary.consumed_bytes += info.size;
    }
    if blocks.end_of_last() < self.capacity() {
      summary.free_gaps += 1;
    }

    Ok(summary)
  }

  pub fn block_map(&self) -> Result<BlockMap> {
    let mut blocks = self.blocks()?;
    let mut regions = vec![Region::Occupied(HEAD_FIELD_SIZE)];

    for info in blocks.by_ref() {
      let info = info?;
      if info.gap_before > 0 {
        regions.push(Region::Free(info.gap_before));
      }
      regions.push(Region::Occupied(info.size));
    }

    let tail = self.capacity() - blocks.end_of_last();
    if tail > 0 {
      regions.push(Region::Free(tail));
    }

    Ok(BlockMap { regions })
  }

  pub fn dump(&self) -> HexDump<'_> {
    HexDump::new(self.bytes())
  }

  /// Checks every link of the chain.
  ///
  /// Beyond what any walk checks, each block's `prev` must name the block
  /// actually in front of it (0 for the first one).
  pub fn verify(&self) -> Result<()> {
    let mut prev = 0;

    for info in self.blocks()? {
      let BlockInfo { offset, prev: stored, .. } = info?;
      if stored != prev {
        return Err(ArenaError::CorruptChain {
          offset,
          reason: "prev link disagrees with chain order",
        });
      }
      prev = offset;
    }

    Ok(())
  }
}
