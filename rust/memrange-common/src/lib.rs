//! Core definitions relied upon by all memrange-* crates: error kinds, the
//! `Result` alias and the `[begin, end)` state classification.

pub mod error;
pub mod result;
pub mod state;

pub use error::{Error, ErrorKind};
pub use result::Result;
pub use state::State;
