//! Ordered argument list of one intercepted call

use std::fmt;

use crate::convert::{FromValue, IntoValue};
use crate::descriptor::MemberDescriptor;
use crate::error::{ProxyError, ProxyResult};
use crate::value::Value;

/// Arguments of a single call, in declaration order.
///
/// The same list is handed to `before_call` (mutably), `on_call` and
/// `after_call`, so rewrites made before dispatch are what the target sees.
#[derive(Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with room for `capacity` values
    pub fn with_capacity(capacity: usize) -> Self {
        Arguments {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Box and append a value
    #[inline]
    pub fn push<T: IntoValue>(&mut self, value: T) {
        self.values.push(value.into_value());
    }

    /// Builder form of `push`
    pub fn with<T: IntoValue>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no arguments
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the value at `index`
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Mutably borrow the value at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.values.get_mut(index)
    }

    /// Replace the value at `index`, returning the previous one
    pub fn set<T: IntoValue>(&mut self, index: usize, value: T) -> Option<Value> {
        self.values
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value.into_value()))
    }

    /// Iterate over the values
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Borrow all values
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Unbox the argument at `index` for dispatch to `member`.
    ///
    /// The list keeps its copy so `after_call` still observes it.
    pub fn arg<T: FromValue>(&self, member: &MemberDescriptor, index: usize) -> ProxyResult<T> {
        let value = self
            .values
            .get(index)
            .cloned()
            .ok_or_else(|| ProxyError::MissingArgument {
                member: member.to_string(),
                index,
                len: self.values.len(),
            })?;
        T::from_value(value)
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Arguments { values }
    }
}

impl From<Arguments> for Vec<Value> {
    fn from(args: Arguments) -> Self {
        args.values
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.values).finish()
    }
}
