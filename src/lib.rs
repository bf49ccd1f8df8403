//! # rheap - A Simulated Heap in a Byte Arena
//!
//! This crate provides a **first-fit heap allocator** that lives entirely
//! inside one fixed-size byte buffer (the "arena"). Callers allocate, free
//! and fill regions by byte offset and can inspect the layout (free gaps,
//! usage, block boundaries, raw bytes) as if debugging a real heap.
//!
//! ## Overview
//!
//! All allocator state is stored in the arena itself. Offset 0 holds the
//! head field; every allocated block starts with a 12-byte header linking it
//! to its neighbours in address order:
//!
//! ```text
//!   Arena Layout:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                              ARENA                                   │
//!   │                                                                      │
//!   │   ┌──────┬──────────┬────────┬──────────┬──────────┬─────────────┐   │
//!   │   │ head │ block A  │  gap   │ block B  │ block C  │     gap     │   │
//!   │   └──────┴──────────┴────────┴──────────┴──────────┴─────────────┘   │
//!   │   0      4          ▲                                                │
//!   │      │              │                                                │
//!   │      └──► A ──next──┼──► B ──next──► C ──next──► 0                   │
//!   │                     │                                                │
//!   │            free space is never recorded, only measured               │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Free space is not tracked by any structure of its own. It is the
//! arithmetic gap between the end of one block and the start of the next,
//! recomputed by walking the chain. That makes `free` O(1) link surgery and
//! `allocate` an O(n) first-fit scan.
//!
//! ## Crate Structure
//!
//! ```text
//!   rheap
//!   ├── storage   - Arena bytes (mmap-backed) and bounds-checked access
//!   ├── block     - Block header codec and layout constants
//!   ├── walker    - Chain walk and first-fit search
//!   ├── heap      - HeapArena: allocate, free, fill, reports
//!   ├── report    - Report values and their text format
//!   ├── command   - Command line parser
//!   ├── shell     - Command loop around a single arena
//!   ├── config    - Shell limits and logging defaults
//!   └── error     - Error types
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rheap::HeapArena;
//!
//! let mut arena = HeapArena::create(100).unwrap();
//!
//! let a = arena.allocate(8).unwrap().unwrap();
//! let b = arena.allocate(10).unwrap().unwrap();
//! assert_eq!((a, b), (16, 36));
//!
//! arena.fill(a, 8, 0x2A).unwrap();
//! arena.free(a).unwrap();
//!
//! assert_eq!(arena.free_summary().unwrap().to_string(), "2 blocks (74 bytes) free");
//! println!("{}", arena.block_map().unwrap());
//! ```
//!
//! ## Allocation
//!
//! A request for `n` bytes needs `n + 12` bytes of gap. Gaps are tried in
//! address order, starting with the one between the head field and the
//! first block, ending with the one before the arena's end. The new block
//! goes at the start of the first gap that fits:
//!
//! ```text
//!   Before:  ┌──────┬─────┬───────────────┬─────┬──────────────────┐
//!            │ head │  A  │   gap (40)    │  B  │    gap (60)      │
//!            └──────┴─────┴───────────────┴─────┴──────────────────┘
//!
//!   alloc(20) needs 32 bytes, the 40-byte gap comes first:
//!
//!   After:   ┌──────┬─────┬──────────┬────┬─────┬──────────────────┐
//!            │ head │  A  │ new (32) │ 8  │  B  │    gap (60)      │
//!            └──────┴─────┴──────────┴────┴─────┴──────────────────┘
//! ```
//!
//! Requests with `n + 16 >= capacity` are refused outright.
//!
//! ## Limitations
//!
//! - **No alignment**: payloads start wherever the gap starts
//! - **No coalescing structure**: adjacency is recomputed on every walk
//! - **Single-threaded**: a `HeapArena` is used through `&mut` only
//! - **Fixed size**: the arena never grows or shrinks
//!
//! ## Safety
//!
//! The only `unsafe` code maps and unmaps the arena bytes. Every header and
//! fill access goes through bounds-checked offsets, and every chain walk
//! validates the headers it follows, so a corrupted arena yields an error
//! rather than undefined behaviour.

mod block;
pub mod command;
pub mod config;
pub mod error;
mod heap;
pub mod report;
pub mod shell;
mod storage;
mod walker;

pub use block::{HEAD_FIELD_SIZE, HEADER_SIZE, RESERVED_MARGIN};
pub use command::{Command, Report};
pub use config::ShellConfig;
pub use error::{ArenaError, CommandError, ShellError};
pub use heap::HeapArena;
pub use report::{BlockMap, FreeSummary, HexDump, Region, UsageSummary};
pub use shell::{Flow, Shell};
pub use storage::MAX_CAPACITY;
pub use walker::{BlockInfo, Blocks};
