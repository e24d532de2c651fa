//! Veneer SDK - runtime core for interface interception proxies
//!
//! A proxy is a synthesized implementation of an interface (a trait used as
//! `dyn Trait`) that routes every member call through a [`Handler`]:
//! `before_call`, then `on_call` (by default forwarding to an optional
//! target), then `after_call`.
//!
//! This crate holds everything the generated code talks to. Most users depend
//! on the `veneer` facade instead, which re-exports it together with the
//! `#[interface]` attribute.
//!
//! # Example
//!
//! ```ignore
//! use veneer::{interface, Handler, Proxy};
//!
//! #[interface]
//! pub trait Calculator {
//!     fn add(&self, a: i32, b: i32) -> i32;
//! }
//!
//! struct Audit;
//! impl Handler<dyn Calculator> for Audit {}
//!
//! let proxy = Proxy::<dyn Calculator, _>::new(Audit)?;
//! assert_eq!(proxy.instance().add(2, 3), 0); // no target: default result
//! ```

#![warn(missing_docs)]

pub mod args;
pub mod config;
pub mod controller;
pub mod convert;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod index;
pub mod interface;
pub mod proxy;
pub mod registry;
pub mod value;

pub use args::Arguments;
pub use config::Config;
pub use controller::{Controller, Slot};
pub use convert::{FromValue, IntoValue};
pub use descriptor::{
    fallback_of, InterfaceDescriptor, MemberDescriptor, MemberKind, MemberSpec, Param, Receiver, TypeKind,
};
pub use error::{ProxyError, ProxyResult};
pub use handler::{forward, Handler, PassThrough};
pub use index::{InterfaceTable, MemberIndex};
pub use interface::{Interface, Target};
pub use proxy::{lookup, members, Bind, Proxy};
pub use value::{Opaque, Value};

/// Support code for generated forwarding bodies. Not a public API.
#[doc(hidden)]
pub mod __private {
    use crate::convert::FromValue;
    use crate::error::{ProxyError, ProxyResult};
    use crate::value::Value;

    pub use std::any::TypeId;
    pub use std::borrow::ToOwned;

    /// Convert a pipeline outcome to the declared return type.
    ///
    /// Trait signatures leave no room for an error, so one is raised as a
    /// panic carrying its message.
    #[inline]
    #[track_caller]
    pub fn complete<R: FromValue>(outcome: ProxyResult<Value>) -> R {
        match outcome.and_then(R::from_value) {
            Ok(value) => value,
            Err(err) => raise(err),
        }
    }

    #[cold]
    #[track_caller]
    fn raise(err: ProxyError) -> ! {
        panic!("{}", err)
    }
}
