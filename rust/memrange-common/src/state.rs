//! Classification of a `[begin, end)` address pair.

use std::fmt;

/// The state of a `[begin, end)` descriptor.
///
/// Every pair of addresses maps to exactly one state. Only [`State::Empty`]
/// and [`State::HasData`] describe usable memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    /// Both `begin` and `end` are null.
    Uninitialized = 0,
    /// `begin == end`, non-null.
    Empty = 1,
    /// `begin < end`, both non-null.
    HasData = 2,
    /// `begin` is null while `end` is not.
    InvalidNullBegin = 3,
    /// `end` is null while `begin` is not.
    InvalidNullEnd = 4,
    /// `begin > end`, both non-null.
    InvalidDangling = 5,
}

impl State {
    /// Classifies a raw address pair.
    #[inline]
    pub fn of<T>(begin: *const T, end: *const T) -> State {
        State::from_addrs(begin as usize, end as usize)
    }

    /// Classifies a pair of addresses given as integers, zero being null.
    #[inline]
    pub const fn from_addrs(begin: usize, end: usize) -> State {
        match (begin == 0, end == 0) {
            (true, true) => State::Uninitialized,
            (true, false) => State::InvalidNullBegin,
            (false, true) => State::InvalidNullEnd,
            (false, false) => {
                if begin == end {
                    State::Empty
                } else if begin < end {
                    State::HasData
                } else {
                    State::InvalidDangling
                }
            }
        }
    }

    /// `true` for [`State::Empty`] and [`State::HasData`].
    #[inline]
    pub const fn is_valid(self) -> bool {
        matches!(self, State::Empty | State::HasData)
    }

    /// `true` for [`State::Uninitialized`] and every `Invalid*` state.
    #[inline]
    pub const fn is_invalid(self) -> bool {
        !self.is_valid()
    }

    /// Stable upper-case name of the state, used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            State::Uninitialized => "UNINITIALIZED",
            State::Empty => "EMPTY",
            State::HasData => "HAS_DATA",
            State::InvalidNullBegin => "INVALID_NULL_BEGIN",
            State::InvalidNullEnd => "INVALID_NULL_END",
            State::InvalidDangling => "INVALID_DANGLING",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
