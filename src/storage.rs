use std::{io, ops::Range, ptr::NonNull, slice};

use byteorder::{ByteOrder, LittleEndian};
use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void};

use crate::{
  block::HEAD_FIELD_SIZE,
  error::{ArenaError, Result},
};

/// Largest capacity whose offsets still fit in a 4-byte header field.
pub const MAX_CAPACITY: usize = u32::MAX as usize;

/// Fixed-length byte buffer backing an arena.
///
/// The bytes come from an anonymous private mapping, so they are zeroed by
/// the kernel and never pass through the global allocator. One guard byte
/// past `capacity` is mapped but never addressed.
///
/// ```text
///   0      4                                         capacity
///   ┌──────┬────────────────────────────────────────────┬───┐
///   │ head │                blocks and gaps             │ g │
///   └──────┴────────────────────────────────────────────┴───┘
/// ```
pub struct ArenaStorage {
  base: NonNull<u8>,
  capacity: usize,
}

impl ArenaStorage {
  pub fn create(capacity: usize) -> Result<Self> {
    if !(HEAD_FIELD_SIZE..=MAX_CAPACITY).contains(&capacity) {
      return Err(ArenaError::Capacity { requested: capacity });
    }

    let address = unsafe {
      libc::mmap(
        std::ptr::null_mut(),
        capacity + 1,
        PROT_READ | PROT_WRITE,
        MAP_PRIVATE | MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if address == MAP_FAILED {
      return Err(ArenaError::Map(io::Error::last_os_error()));
    }

    let base = NonNull::new(address.cast::<u8>())
      .ok_or_else(|| ArenaError::Map(io::Error::other("mmap returned null")))?;

    Ok(Self { base, capacity })
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// The addressable bytes, guard byte excluded.
  pub fn as_bytes(&self) -> &[u8] {
    // The mapping is `capacity + 1` bytes long and lives as long as `self`.
    unsafe { slice::from_raw_parts(self.base.as_ptr(), self.capacity) }
  }

  fn as_bytes_mut(&mut self) -> &mut [u8] {
    unsafe { slice::from_raw_parts_mut(self.base.as_ptr(), self.capacity) }
  }

  fn range(
    &self,
    offset: usize,
    len: usize,
  ) -> Result<Range<usize>> {
    match offset.checked_add(len) {
      Some(end) if end <= self.capacity => Ok(offset..end),
      _ => Err(ArenaError::OutOfBounds {
        offset,
        len,
        capacity: self.capacity,
      }),
    }
  }

  pub fn read_u32(
    &self,
    offset: usize,
  ) -> Result<u32> {
    let range = self.range(offset, 4)?;
    Ok(LittleEndian::read_u32(&self.as_bytes()[range]))
  }

  pub fn write_u32(
    &mut self,
    offset: usize,
    value: u32,
  ) -> Result<()> {
    let range = self.range(offset, 4)?;
    LittleEndian::write_u32(&mut self.as_bytes_mut()[range], value);
    Ok(())
  }

  /// Sets `len` bytes starting at `offset` to `value`.
  pub fn fill(
    &mut self,
    offset: usize,
    len: usize,
    value: u8,
  ) -> Result<()> {
    let range = self.range(offset, len)?;
    self.as_bytes_mut()[range].fill(value);
    Ok(())
  }
}

impl Drop for ArenaStorage {
  fn drop(&mut self) {
    let result = unsafe { libc::munmap(self.base.as_ptr().cast::<c_void>(), self.capacity + 1) };
    if result != 0 {
      tracing::warn!(
        error = %io::Error::last_os_error(),
        capacity = self.capacity,
        "failed to unmap arena"
      );
    }
  }
}
