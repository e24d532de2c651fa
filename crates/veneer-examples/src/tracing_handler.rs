//! Logs every call through `tracing`

use tracing::{debug, info_span, trace, warn, Level};
use veneer::{forward, Arguments, Handler, Interface, MemberDescriptor, ProxyResult, Target, Value};

/// Logs each stage of each call.
///
/// Dispatch runs inside a `call` span carrying the member and its index, so
/// events emitted by the target nest under it.
#[derive(Debug, Clone, Copy)]
pub struct TracingHandler {
    level: Level,
}

impl TracingHandler {
    /// Log at `DEBUG`
    pub fn new() -> Self {
        TracingHandler { level: Level::DEBUG }
    }

    /// Log stage events at `TRACE` instead
    pub fn verbose() -> Self {
        TracingHandler { level: Level::TRACE }
    }
}

impl Default for TracingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ?Sized + Interface> Handler<I> for TracingHandler {
    fn before_call(&self, member: &MemberDescriptor, args: &mut Arguments) -> ProxyResult<()> {
        if self.level == Level::TRACE {
            trace!(member = %member, args = ?args, "call");
        } else {
            debug!(member = %member, arity = args.len(), "call");
        }
        Ok(())
    }

    fn on_call(&self, target: Target<'_, I>, member: &MemberDescriptor, args: &Arguments) -> ProxyResult<Value> {
        let span = info_span!("call", member = %member, index = member.index());
        let _entered = span.enter();
        let present = !target.is_absent();
        let result = forward(target, member, args);
        if let Err(e) = &result {
            warn!(error = %e, "dispatch failed");
        } else if !present {
            debug!("no target; default result");
        }
        result
    }

    fn after_call(&self, member: &MemberDescriptor, _args: &Arguments, result: &Value) {
        if self.level == Level::TRACE {
            trace!(member = %member, result = ?result, "returned");
        } else {
            debug!(member = %member, "returned");
        }
    }
}
