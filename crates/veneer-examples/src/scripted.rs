//! Fixed answers for selected members

use rustc_hash::FxHashMap;
use veneer::{forward, Arguments, Handler, Interface, IntoValue, MemberDescriptor, ProxyError, ProxyResult, Target, Value};

enum Answer {
    Value(Value),
    Fail(String),
}

/// Answers members by name with configured results; everything else is
/// forwarded as usual.
#[derive(Default)]
pub struct Scripted {
    answers: FxHashMap<String, Answer>,
}

impl Scripted {
    /// Create with no answers
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `member` with `value`
    pub fn answer<T: IntoValue>(mut self, member: &str, value: T) -> Self {
        self.answers.insert(member.to_string(), Answer::Value(value.into_value()));
        self
    }

    /// Fail `member` with a handler error
    pub fn fail(mut self, member: &str, message: &str) -> Self {
        self.answers.insert(member.to_string(), Answer::Fail(message.to_string()));
        self
    }

    /// Check if `member` is scripted
    pub fn scripts(&self, member: &str) -> bool {
        self.answers.contains_key(member)
    }
}

impl<I: ?Sized + Interface> Handler<I> for Scripted {
    fn on_call(&self, target: Target<'_, I>, member: &MemberDescriptor, args: &Arguments) -> ProxyResult<Value> {
        match self.answers.get(member.name()) {
            Some(Answer::Value(value)) => Ok(value.clone()),
            Some(Answer::Fail(message)) => Err(ProxyError::handler(message.clone())),
            None => forward(target, member, args),
        }
    }
}
