//! Ready-made handlers for Veneer proxies
//!
//! Every handler here works for any interface:
//!
//! - [`TracingHandler`] logs each call through `tracing`
//! - [`Recorder`] keeps `(member, args, result)` for later inspection
//! - [`Memoize`] caches results of `&self` members
//! - [`Rewrite`] rewrites arguments with a closure
//! - [`Scripted`] answers selected members with fixed results
//! - [`remote`] turns calls into JSON envelopes and back

pub mod memoize;
pub mod recorder;
pub mod remote;
pub mod rewrite;
pub mod scripted;
pub mod tracing_handler;

pub use memoize::Memoize;
pub use recorder::{Record, Recorder};
pub use rewrite::Rewrite;
pub use scripted::Scripted;
pub use tracing_handler::TracingHandler;
