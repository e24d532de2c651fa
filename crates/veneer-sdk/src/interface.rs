//! Interface trait, the seam between generated code and the runtime
//!
//! `#[veneer::interface]` implements `Interface` for `dyn Trait`. It can also
//! be written by hand, which is how the SDK's own tests describe interfaces.

use crate::args::Arguments;
use crate::descriptor::{InterfaceDescriptor, MemberDescriptor};
use crate::error::{ProxyError, ProxyResult};
use crate::value::Value;

/// An interface type (`dyn Trait`) that proxies can be synthesized for.
pub trait Interface: 'static {
    /// Describe the declared members and base interfaces.
    ///
    /// Called at most once per process, during synthesis.
    fn descriptor() -> InterfaceDescriptor;

    /// Invoke `member` on a concrete target with the given arguments.
    ///
    /// Members declared by a base interface are delegated to that base
    /// after upcasting the target.
    fn dispatch(target: Target<'_, Self>, member: &MemberDescriptor, args: &Arguments) -> ProxyResult<Value>;
}

/// Borrow of the wrapped target handed to `on_call`.
pub enum Target<'a, I: ?Sized> {
    /// The controller has no target
    Absent,
    /// Target borrowed for a `&self` member
    Shared(&'a I),
    /// Target borrowed for a `&mut self` member
    Exclusive(&'a mut I),
}

impl<'a, I: ?Sized> Target<'a, I> {
    /// Wrap an optional shared borrow
    pub fn from_shared(target: Option<&'a I>) -> Self {
        match target {
            Some(t) => Target::Shared(t),
            None => Target::Absent,
        }
    }

    /// Wrap an optional exclusive borrow
    pub fn from_exclusive(target: Option<&'a mut I>) -> Self {
        match target {
            Some(t) => Target::Exclusive(t),
            None => Target::Absent,
        }
    }

    /// Check if there is no target
    pub fn is_absent(&self) -> bool {
        matches!(self, Target::Absent)
    }

    /// Shared view of the target for `member`
    pub fn shared(self, member: &MemberDescriptor) -> ProxyResult<&'a I> {
        match self {
            Target::Shared(t) => Ok(t),
            Target::Exclusive(t) => Ok(t),
            Target::Absent => Err(ProxyError::MissingTarget {
                member: member.to_string(),
            }),
        }
    }

    /// Exclusive view of the target for `member`
    pub fn exclusive(self, member: &MemberDescriptor) -> ProxyResult<&'a mut I> {
        match self {
            Target::Exclusive(t) => Ok(t),
            Target::Shared(_) => Err(ProxyError::ReceiverMismatch {
                member: member.to_string(),
            }),
            Target::Absent => Err(ProxyError::MissingTarget {
                member: member.to_string(),
            }),
        }
    }

    /// Reborrow without giving up the original
    pub fn reborrow(&mut self) -> Target<'_, I> {
        match self {
            Target::Absent => Target::Absent,
            Target::Shared(t) => Target::Shared(*t),
            Target::Exclusive(t) => Target::Exclusive(&mut **t),
        }
    }

    /// View the target as a base interface
    pub fn upcast<U: ?Sized>(
        self,
        shared: impl FnOnce(&'a I) -> &'a U,
        exclusive: impl FnOnce(&'a mut I) -> &'a mut U,
    ) -> Target<'a, U> {
        match self {
            Target::Absent => Target::Absent,
            Target::Shared(t) => Target::Shared(shared(t)),
            Target::Exclusive(t) => Target::Exclusive(exclusive(t)),
        }
    }
}
