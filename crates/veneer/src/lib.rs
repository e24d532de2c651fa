//! Veneer - runtime interface proxies
//!
//! Mark a trait with `#[interface]` and get, for any handler, a
//! `Proxy<dyn Trait, H>` that implements the trait by routing each call
//! through three hooks:
//!
//! 1. `before_call` - inspect or rewrite the arguments, or reject the call
//! 2. `on_call` - produce the result (by default: forward to the target, or
//!    return the member's default when there is no target)
//! 3. `after_call` - observe the final result
//!
//! # Example
//!
//! ```ignore
//! use veneer::{interface, Arguments, Handler, MemberDescriptor, Proxy, ProxyResult};
//!
//! #[interface]
//! pub trait Calculator {
//!     fn add(&self, a: i32, b: i32) -> i32;
//! }
//!
//! struct Adder;
//! impl Calculator for Adder {
//!     fn add(&self, a: i32, b: i32) -> i32 { a + b }
//! }
//!
//! struct Audit;
//! impl Handler<dyn Calculator> for Audit {
//!     fn before_call(&self, member: &MemberDescriptor, args: &mut Arguments) -> ProxyResult<()> {
//!         println!("{} {:?}", member, args);
//!         Ok(())
//!     }
//! }
//!
//! let proxy = Proxy::<dyn Calculator, _>::with_target(Audit, Box::new(Adder))?;
//! assert_eq!(proxy.instance().add(2, 3), 5);
//! ```
//!
//! Per-interface work (member indexing, slot resolution) happens once per
//! process, on first use, and is shared by every proxy of that interface.

pub use veneer_macros::{interface, property};
pub use veneer_sdk::*;
