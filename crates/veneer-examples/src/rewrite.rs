//! Closure-driven argument rewriting

use veneer::{Arguments, Handler, Interface, MemberDescriptor, ProxyResult};

/// Runs a closure over the arguments of every call before dispatch.
///
/// The closure may change values in place or reject the call.
///
/// ```ignore
/// let clamp = Rewrite::new(|member, args| {
///     if member.name() == "set_volume" {
///         let v = args.arg::<u8>(member, 0)?;
///         args.set(0, v.min(11));
///     }
///     Ok(())
/// });
/// ```
pub struct Rewrite<F> {
    rewrite: F,
}

impl<F> Rewrite<F>
where
    F: Fn(&MemberDescriptor, &mut Arguments) -> ProxyResult<()>,
{
    /// Wrap a rewriting closure
    pub fn new(rewrite: F) -> Self {
        Rewrite { rewrite }
    }
}

impl<I, F> Handler<I> for Rewrite<F>
where
    I: ?Sized + Interface,
    F: Fn(&MemberDescriptor, &mut Arguments) -> ProxyResult<()>,
{
    fn before_call(&self, member: &MemberDescriptor, args: &mut Arguments) -> ProxyResult<()> {
        (self.rewrite)(member, args)
    }
}
