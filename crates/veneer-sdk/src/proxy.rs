//! Proxy — the object handed out in place of a target
//!
//! `Proxy<dyn T, H>` implements `T` (through code generated by
//! `#[veneer::interface]`); its only state is the controller. Every trait
//! method call becomes a controller trigger.

use crate::controller::Controller;
use crate::descriptor::MemberDescriptor;
use crate::error::ProxyResult;
use crate::handler::{Handler, PassThrough};
use crate::index::InterfaceTable;
use crate::interface::Interface;
use std::sync::Arc;

/// Synthesized implementation of interface `I` routed through handler `H`
pub struct Proxy<I: ?Sized + Interface, H = PassThrough> {
    controller: Controller<I, H>,
}

/// Views a proxy as the interface it implements.
///
/// Generated for every `#[veneer::interface]` trait.
pub trait Bind<H>: Interface {
    /// `&dyn T` view
    fn view(proxy: &Proxy<Self, H>) -> &Self;

    /// `&mut dyn T` view
    fn view_mut(proxy: &mut Proxy<Self, H>) -> &mut Self;
}

impl<I: ?Sized + Interface, H: Handler<I>> Proxy<I, H> {
    /// Proxy without a target: unhandled calls produce default results
    pub fn new(handler: H) -> ProxyResult<Self> {
        Ok(Proxy {
            controller: Controller::new(handler)?,
        })
    }

    /// Proxy decorating `target`
    pub fn with_target(handler: H, target: Box<I>) -> ProxyResult<Self> {
        Ok(Proxy {
            controller: Controller::with_target(handler, target)?,
        })
    }

    /// The proxy as `&dyn I`
    pub fn instance(&self) -> &I
    where
        I: Bind<H>,
    {
        I::view(self)
    }

    /// The proxy as `&mut dyn I`
    pub fn instance_mut(&mut self) -> &mut I
    where
        I: Bind<H>,
    {
        I::view_mut(self)
    }
}

impl<I: ?Sized + Interface> Proxy<I, PassThrough> {
    /// Transparent proxy forwarding every call to `target`
    pub fn passthrough(target: Box<I>) -> ProxyResult<Self> {
        Self::with_target(PassThrough, target)
    }
}

impl<I: ?Sized + Interface, H> Proxy<I, H> {
    /// The controller
    #[inline]
    pub fn controller(&self) -> &Controller<I, H> {
        &self.controller
    }

    /// The controller, mutably
    #[inline]
    pub fn controller_mut(&mut self) -> &mut Controller<I, H> {
        &mut self.controller
    }

    /// The handler
    pub fn handler(&self) -> &H {
        self.controller.handler()
    }

    /// Give up the proxy, keeping its controller
    pub fn into_controller(self) -> Controller<I, H> {
        self.controller
    }
}

impl<I: ?Sized + Interface, H: Handler<I>> From<Controller<I, H>> for Proxy<I, H> {
    fn from(controller: Controller<I, H>) -> Self {
        Proxy { controller }
    }
}

/// Member of interface `I` at flattened `index`, without a proxy instance
pub fn lookup<I: ?Sized + Interface>(index: usize) -> ProxyResult<MemberDescriptor> {
    crate::registry::lookup::<I>(index)
}

/// Cached table of interface `I`
pub fn members<I: ?Sized + Interface>() -> ProxyResult<Arc<InterfaceTable>> {
    crate::registry::resolve::<I>()
}
