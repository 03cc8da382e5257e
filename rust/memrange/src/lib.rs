//! Bounds-checked descriptors over contiguous byte regions.
//!
//! - [`MemoryView`]: read-only `[begin, end)` descriptor with state
//!   classification, checked accessors, and forward/reverse search and compare.
//! - [`MemoryRange`]: the mutable counterpart, with the same layout.
//! - [`AllocatedRange`]: a range that owns its block and resizes it through an
//!   explicit [`Allocator`] handle.
//! - [`TypedRange`]: a range tagged with an element size.
//!
//! Every descriptor is in exactly one [`State`]. Queries fail with
//! `InvalidRange` unless the state is `EMPTY` or `HAS_DATA`:
//!
//! ```
//! use memrange::{MemoryView, State};
//!
//! let view = MemoryView::from("hello world");
//! assert_eq!(view.get_state(), State::HasData);
//! assert_eq!(view.find_offset(&"world".into()).unwrap(), Some(6));
//!
//! let uninit = MemoryView::uninit();
//! assert!(uninit.size().is_err());
//! ```

pub mod allocated;
pub mod range;
pub mod typed;
pub mod view;

pub use allocated::AllocatedRange;
pub use range::MemoryRange;
pub use typed::TypedRange;
pub use view::MemoryView;

pub use memrange_alloc::{Allocator, HeapAllocator, PageAllocator};
pub use memrange_common::{Error, ErrorKind, Result, State};
