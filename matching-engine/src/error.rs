//! Engine-internal error kinds (§7).
//!
//! None of these ever escape `submit`/`cancel`/`amend` as an `Err` to a
//! trading client — each is caught at the call site and converted into a
//! single *rejected* [`crate::types::Execution`]. They exist as a typed
//! enum so the engine's own control flow (and its tests) can match on
//! *why* a call was rejected.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("amend quantity below filled quantity")]
    AmendBelowFilled,

    #[error("invalid order: {0}")]
    InvalidOrder(String),
}
