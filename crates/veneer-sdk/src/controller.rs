//! Per-proxy interception pipeline
//!
//! A controller pairs a handler with an optional target and the interface's
//! shared table. Every forwarded call runs:
//!
//! ```text
//! before_call(member, &mut args)   may rewrite args or reject
//!   on_call(target, member, &args) produces the result
//!     after_call(member, &args, &result)
//! ```
//!
//! An error (or panic) from the first two stages skips the rest.

use std::any::TypeId;
use std::sync::Arc;

use tracing::trace;

use crate::args::Arguments;
use crate::descriptor::{MemberDescriptor, Receiver};
use crate::error::ProxyResult;
use crate::handler::Handler;
use crate::index::InterfaceTable;
use crate::interface::{Interface, Target};
use crate::value::Value;

/// Declared position of a member, as baked into forwarding bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Declaring interface
    pub interface: TypeId,
    /// Position in the declaring interface
    pub slot: usize,
}

impl Slot {
    /// Slot `slot` of interface `D`
    #[inline]
    pub fn of<D: ?Sized + 'static>(slot: usize) -> Self {
        Slot {
            interface: TypeId::of::<D>(),
            slot,
        }
    }
}

/// Interception state behind one proxy
pub struct Controller<I: ?Sized + Interface, H> {
    handler: H,
    target: Option<Box<I>>,
    table: Arc<InterfaceTable>,
    trace: bool,
}

impl<I: ?Sized + Interface, H: Handler<I>> Controller<I, H> {
    /// Controller without a target
    pub fn new(handler: H) -> ProxyResult<Self> {
        Self::build(handler, None)
    }

    /// Controller wrapping `target`
    pub fn with_target(handler: H, target: Box<I>) -> ProxyResult<Self> {
        Self::build(handler, Some(target))
    }

    fn build(handler: H, target: Option<Box<I>>) -> ProxyResult<Self> {
        Ok(Controller {
            handler,
            target,
            table: crate::registry::resolve::<I>()?,
            trace: crate::config::trace_calls(),
        })
    }

    /// Run the pipeline for a `&self` member
    #[inline]
    pub fn trigger(&self, slot: Slot, args: Arguments) -> ProxyResult<Value> {
        let member = self.table.resolve(slot.interface, slot.slot)?;
        let target = Target::from_shared(self.target.as_deref());
        run(&self.handler, target, member, args, self.trace)
    }

    /// Run the pipeline for a `&mut self` member
    #[inline]
    pub fn trigger_mut(&mut self, slot: Slot, args: Arguments) -> ProxyResult<Value> {
        let member = self.table.resolve(slot.interface, slot.slot)?;
        let target = Target::from_exclusive(self.target.as_deref_mut());
        run(&self.handler, target, member, args, self.trace)
    }

    /// Run the pipeline for the member at a flattened index.
    ///
    /// The target is borrowed the way the member declares its receiver.
    pub fn invoke(&mut self, index: usize, args: Arguments) -> ProxyResult<Value> {
        let member = self.table.lookup(index)?;
        let target = match member.receiver() {
            Receiver::Shared => Target::from_shared(self.target.as_deref()),
            Receiver::Exclusive => Target::from_exclusive(self.target.as_deref_mut()),
        };
        run(&self.handler, target, member, args, self.trace)
    }

    /// Run the first member named `name`
    pub fn invoke_named(&mut self, name: &str, args: Arguments) -> ProxyResult<Value> {
        let index = self
            .table
            .members()
            .find(name)
            .map(MemberDescriptor::index)
            .ok_or_else(|| crate::error::ProxyError::UnknownMember {
                interface: self.table.name().to_string(),
                member: name.to_string(),
            })?;
        self.invoke(index, args)
    }
}

impl<I: ?Sized + Interface, H> Controller<I, H> {
    /// The handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The handler, mutably
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// The wrapped target, if any
    pub fn target(&self) -> Option<&I> {
        self.target.as_deref()
    }

    /// The wrapped target, mutably
    pub fn target_mut(&mut self) -> Option<&mut I> {
        self.target.as_deref_mut()
    }

    /// Swap in a new target, returning the old one
    pub fn replace_target(&mut self, target: Box<I>) -> Option<Box<I>> {
        self.target.replace(target)
    }

    /// Remove the target; later calls produce default results
    pub fn take_target(&mut self) -> Option<Box<I>> {
        self.target.take()
    }

    /// The interface's shared table
    pub fn table(&self) -> &Arc<InterfaceTable> {
        &self.table
    }
}

fn run<I: ?Sized + Interface, H: Handler<I>>(
    handler: &H,
    target: Target<'_, I>,
    member: &MemberDescriptor,
    mut args: Arguments,
    trace: bool,
) -> ProxyResult<Value> {
    if trace {
        trace!(member = %member, index = member.index(), args = ?args, "before_call");
    }
    handler.before_call(member, &mut args)?;

    if trace {
        trace!(member = %member, present = !target.is_absent(), args = ?args, "on_call");
    }
    let result = handler.on_call(target, member, &args)?;

    if trace {
        trace!(member = %member, result = ?result, "after_call");
    }
    handler.after_call(member, &args, &result);
    Ok(result)
}
