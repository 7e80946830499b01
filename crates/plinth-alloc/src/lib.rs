//! Allocation substrate for the Plinth collision kernel.
//!
//! Every geometric object and every per-step scratch buffer in Plinth is
//! served through the [`Allocator`] capability trait. Three strategies are
//! provided, and they layer: the arena and the free list each draw their
//! backing extents from a *primary* allocator, which is usually the
//! [`SystemAllocator`].
//!
//! ```text
//! SystemAllocator (global heap, ultimate fallback)
//! ├── ArenaAllocator    bump offset over one extent, bulk reset,
//! │                     overflow redirected to the primary
//! └── FreeListAllocator intrusive header chain over extents,
//!                       first-fit + split + coalesce
//! ```
//!
//! # Contract
//!
//! - `allocate(size)` requires `size > 0` and returns memory aligned to
//!   [`MAX_ALIGN`]. A zero size is a programmer error and panics.
//! - `free(ptr, size)` is `unsafe`: the pointer must come from the same
//!   allocator and `size` must be the size it was allocated with.
//! - Exhaustion of the system heap is fatal
//!   ([`std::alloc::handle_alloc_error`]); arena exhaustion is not, the
//!   request is redirected to the primary.
//!
//! # Concurrency
//!
//! [`ArenaAllocator`] serializes `allocate` and `free` behind a single
//! mutex. This is a throughput bottleneck when many threads share one
//! arena; parallel workers should each hold a private arena. `reset`
//! takes `&mut self`, so it cannot run while anything still borrows the
//! arena.
//! [`FreeListAllocator`] is not synchronized at all and is `!Sync`.
//!
//! All raw pointer arithmetic and heap calls live in the private `raw`
//! module.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod allocator;
pub mod arena;
pub mod config;
pub mod free_list;
mod raw;
pub mod system;
pub mod tracking;

pub use allocator::{align_up, Allocator, MAX_ALIGN};
pub use arena::{ArenaAllocator, ArenaStats};
pub use config::{ArenaConfig, FreeListConfig};
pub use free_list::{FreeListAllocator, FreeListStats};
pub use plinth_core::ConfigError;
pub use system::SystemAllocator;
pub use tracking::TrackingAllocator;
