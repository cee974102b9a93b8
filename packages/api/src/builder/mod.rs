//! Fluent request construction
//!
//! The builder is split by concern: base structure and `build` in
//! [`core`], request-line setters in [`methods`], header handling in
//! [`headers`], body attachment in [`body`].

pub mod body;
pub mod core;
pub mod headers;
pub mod methods;

pub use self::core::{OrderedRequestBuilder, OrderedRequestFactory};
