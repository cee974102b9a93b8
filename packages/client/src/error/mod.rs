//! Client error taxonomy
//!
//! A single [`Error`] type covers every failure a request can surface:
//! engine-reported transport errors, synchronous start failures, timeouts,
//! cancellations, and local validation problems. Callers branch on the
//! `is_*` predicates rather than matching internals.

mod constructors;
mod types;

pub use constructors::{
    body, builder, canceled, decode, disposed, engine, invalid_argument, protocol_violation,
    redirect, timeout, transport,
};
pub use types::{BoxError, Error, Kind, Result};
