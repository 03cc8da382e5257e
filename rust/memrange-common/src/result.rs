use crate::{error::Error, state::State};

pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

/// Fails with `InvalidRange` unless `state` is `EMPTY` or `HAS_DATA`.
#[inline]
pub fn verify_state(op: &'static str, state: State) -> Result<()> {
    if state.is_valid() {
        Ok(())
    } else {
        invalid_range(op, state)
    }
}

/// Fails with `InvalidAlignment` unless `alignment` is a non-zero power of two.
#[inline]
pub fn verify_alignment(op: &'static str, alignment: usize) -> Result<()> {
    if alignment != 0 && (alignment & (alignment - 1)) == 0 {
        Ok(())
    } else {
        Err(Error::invalid_alignment(op, alignment))
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
pub fn invalid_range(op: &'static str, state: State) -> Result<()> {
    Err(Error::invalid_range(op, state))
}
