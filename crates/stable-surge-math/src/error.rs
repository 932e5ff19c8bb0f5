//! Arithmetic error codes shared by all pool math in this crate, mirroring
//! the revert codes of the on-chain math libraries this kernel models.

use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// Division by zero, including a zero balance where the math requires a
    /// positive one.
    #[error("division by zero")]
    ZeroDivision,
    /// A subtraction would produce a negative amount.
    #[error("subtraction underflow")]
    SubOverflow,
    /// A computed amount exceeds the available balance.
    #[error("amount out of bounds")]
    XOutOfBounds,
    /// A token index is out of range, duplicated, or the balance set is too
    /// short.
    #[error("invalid token index")]
    InvalidToken,
    /// Square root of a negative operand.
    #[error("invalid exponent")]
    InvalidExponent,
}
