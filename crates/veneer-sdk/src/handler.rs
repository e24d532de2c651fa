//! Handler trait: the three interception hooks
//!
//! Every call on a proxy runs `before_call`, `on_call` and `after_call` in
//! that order. Handlers override any subset; the defaults forward to the
//! target (or produce the member's default result when there is none).

use std::sync::Arc;

use crate::args::Arguments;
use crate::descriptor::MemberDescriptor;
use crate::error::ProxyResult;
use crate::interface::{Interface, Target};
use crate::value::Value;

/// Interception hooks for proxies of interface `I`.
///
/// Hooks take `&self`; handlers that keep state use interior mutability.
pub trait Handler<I: ?Sized + Interface> {
    /// Runs first. May rewrite `args` (the same list reaches `on_call`) or
    /// reject the call, in which case nothing else runs.
    fn before_call(&self, member: &MemberDescriptor, args: &mut Arguments) -> ProxyResult<()> {
        let _ = (member, args);
        Ok(())
    }

    /// Produces the call's result. Defaults to [`forward`].
    fn on_call(&self, target: Target<'_, I>, member: &MemberDescriptor, args: &Arguments) -> ProxyResult<Value> {
        forward(target, member, args)
    }

    /// Runs last, only when `on_call` succeeded.
    fn after_call(&self, member: &MemberDescriptor, args: &Arguments, result: &Value) {
        let _ = (member, args, result);
    }
}

/// Default dispatch: invoke `member` on the target, or produce the member's
/// type-appropriate default when there is no target.
///
/// Panics raised by the target propagate unchanged.
pub fn forward<I: ?Sized + Interface>(
    target: Target<'_, I>,
    member: &MemberDescriptor,
    args: &Arguments,
) -> ProxyResult<Value> {
    match target {
        Target::Absent => Ok(member.fallback()),
        present => I::dispatch(present, member, args),
    }
}

/// Handler that keeps every default: a transparent pass-through.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<I: ?Sized + Interface> Handler<I> for PassThrough {}

impl<I: ?Sized + Interface, H: Handler<I> + ?Sized> Handler<I> for Arc<H> {
    fn before_call(&self, member: &MemberDescriptor, args: &mut Arguments) -> ProxyResult<()> {
        (**self).before_call(member, args)
    }

    fn on_call(&self, target: Target<'_, I>, member: &MemberDescriptor, args: &Arguments) -> ProxyResult<Value> {
        (**self).on_call(target, member, args)
    }

    fn after_call(&self, member: &MemberDescriptor, args: &Arguments, result: &Value) {
        (**self).after_call(member, args, result)
    }
}

impl<I: ?Sized + Interface, H: Handler<I> + ?Sized> Handler<I> for Box<H> {
    fn before_call(&self, member: &MemberDescriptor, args: &mut Arguments) -> ProxyResult<()> {
        (**self).before_call(member, args)
    }

    fn on_call(&self, target: Target<'_, I>, member: &MemberDescriptor, args: &Arguments) -> ProxyResult<Value> {
        (**self).on_call(target, member, args)
    }

    fn after_call(&self, member: &MemberDescriptor, args: &Arguments, result: &Value) {
        (**self).after_call(member, args, result)
    }
}
