//! Interface and member descriptors
//!
//! An `InterfaceDescriptor` is what `#[veneer::interface]` emits for a trait:
//! the declared members in declaration order and the supertrait interfaces.
//! The registry turns it into a `MemberDescriptor` per indexed member.

use std::any::TypeId;
use std::fmt;

use serde::Serialize;

use crate::convert::{FromValue, IntoValue};
use crate::error::ProxyResult;
use crate::index::InterfaceTable;
use crate::interface::Interface;
use crate::value::Value;
use std::sync::Arc;

/// What kind of type a descriptor claims to describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    /// Trait used as a trait object
    Interface,
    /// Concrete struct or enum
    Class,
    /// Plain value type
    Value,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Interface => write!(f, "interface"),
            TypeKind::Class => write!(f, "class"),
            TypeKind::Value => write!(f, "value type"),
        }
    }
}

/// Role of a member within its interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum MemberKind {
    /// Ordinary method
    Method,
    /// Property read accessor
    Getter {
        /// Property name
        property: &'static str,
    },
    /// Property write accessor
    Setter {
        /// Property name
        property: &'static str,
    },
}

impl MemberKind {
    /// Check if this is a property accessor
    pub fn is_accessor(&self) -> bool {
        !matches!(self, MemberKind::Method)
    }

    /// Property name for accessors
    pub fn property(&self) -> Option<&'static str> {
        match self {
            MemberKind::Method => None,
            MemberKind::Getter { property } | MemberKind::Setter { property } => Some(property),
        }
    }
}

/// How a member borrows its receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    /// `&self`
    Shared,
    /// `&mut self`
    Exclusive,
}

/// Declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Param {
    /// Parameter name
    pub name: &'static str,
    /// Parameter type as written
    #[serde(rename = "type")]
    pub ty: &'static str,
}

/// Produces the type-appropriate default result of a member
pub type FallbackFn = fn() -> Value;

/// Default result of a member returning `R`
pub fn fallback_of<R: FromValue + IntoValue>() -> Value {
    match R::fallback() {
        Some(value) => value.into_value(),
        None => Value::Absent,
    }
}

/// Member as declared on one interface
#[derive(Debug, Clone)]
pub struct MemberSpec {
    pub(crate) name: &'static str,
    pub(crate) kind: MemberKind,
    pub(crate) receiver: Receiver,
    pub(crate) params: Vec<Param>,
    pub(crate) returns: &'static str,
    pub(crate) returns_unit: bool,
    pub(crate) fallback: FallbackFn,
}

impl MemberSpec {
    /// Declare an ordinary method
    pub fn method(name: &'static str, receiver: Receiver) -> Self {
        Self::with_kind(name, MemberKind::Method, receiver)
    }

    /// Declare a property getter (`&self`, no parameters)
    pub fn getter(name: &'static str, property: &'static str) -> Self {
        Self::with_kind(name, MemberKind::Getter { property }, Receiver::Shared)
    }

    /// Declare a property setter (`&mut self`, one parameter)
    pub fn setter(name: &'static str, property: &'static str) -> Self {
        Self::with_kind(name, MemberKind::Setter { property }, Receiver::Exclusive)
    }

    fn with_kind(name: &'static str, kind: MemberKind, receiver: Receiver) -> Self {
        MemberSpec {
            name,
            kind,
            receiver,
            params: Vec::new(),
            returns: "()",
            returns_unit: true,
            fallback: fallback_of::<()>,
        }
    }

    /// Override the receiver
    pub fn receiver(mut self, receiver: Receiver) -> Self {
        self.receiver = receiver;
        self
    }

    /// Append a parameter
    pub fn param(mut self, name: &'static str, ty: &'static str) -> Self {
        self.params.push(Param { name, ty });
        self
    }

    /// Set the return type
    pub fn returns<R: FromValue + IntoValue>(mut self, ty: &'static str) -> Self {
        self.returns = ty;
        self.returns_unit = false;
        self.fallback = fallback_of::<R>;
        self
    }

    /// Member name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Resolves the cached table of a base interface
pub(crate) type ResolveFn = fn() -> ProxyResult<Arc<InterfaceTable>>;

/// Direct base (supertrait) of an interface
#[derive(Clone)]
pub struct BaseRef {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) resolve: ResolveFn,
    pub(crate) describe: fn() -> InterfaceDescriptor,
}

impl fmt::Debug for BaseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseRef").field("name", &self.name).finish()
    }
}

/// Description of an interface type, as generated for a trait
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) module: Option<&'static str>,
    pub(crate) kind: TypeKind,
    pub(crate) members: Vec<MemberSpec>,
    pub(crate) bases: Vec<BaseRef>,
    pub(crate) expansion: Option<&'static str>,
}

impl InterfaceDescriptor {
    /// Describe the interface `I`
    pub fn interface<I: ?Sized + 'static>(name: &'static str) -> Self {
        Self::of_kind::<I>(name, TypeKind::Interface)
    }

    /// Describe `T` as an arbitrary kind of type
    pub fn of_kind<T: ?Sized + 'static>(name: &'static str, kind: TypeKind) -> Self {
        InterfaceDescriptor {
            id: TypeId::of::<T>(),
            name,
            module: None,
            kind,
            members: Vec::new(),
            bases: Vec::new(),
            expansion: None,
        }
    }

    /// Add a direct base interface
    pub fn extends<B: ?Sized + Interface>(mut self, name: &'static str) -> Self {
        self.bases.push(BaseRef {
            id: TypeId::of::<B>(),
            name,
            resolve: crate::registry::resolve::<B>,
            describe: B::descriptor,
        });
        self
    }

    /// Add a declared member
    pub fn member(mut self, spec: MemberSpec) -> Self {
        self.members.push(spec);
        self
    }

    /// Record the module declaring the interface (`module_path!()`)
    pub fn in_module(mut self, path: &'static str) -> Self {
        self.module = Some(path);
        self
    }

    /// Attach the generated source text for diagnostics
    pub fn with_expansion(mut self, expansion: &'static str) -> Self {
        self.expansion = Some(expansion);
        self
    }

    /// Interface name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declaring module, when recorded
    pub fn module(&self) -> Option<&'static str> {
        self.module
    }

    /// Declared kind
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Declared members
    pub fn members(&self) -> &[MemberSpec] {
        &self.members
    }
}

/// One indexed member of an interface table.
///
/// Handlers receive this for every call. `index` is the flattened position
/// in the table the call went through; `interface`/`slot` identify the
/// declaration and are the same in every table that includes the member.
#[derive(Clone)]
pub struct MemberDescriptor {
    pub(crate) index: usize,
    pub(crate) declaring: TypeId,
    pub(crate) interface: &'static str,
    pub(crate) slot: usize,
    pub(crate) spec: MemberSpec,
}

impl MemberDescriptor {
    /// Flattened index in the owning table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Declaring interface id
    pub fn declaring(&self) -> TypeId {
        self.declaring
    }

    /// Declaring interface name
    pub fn interface(&self) -> &'static str {
        self.interface
    }

    /// Declaration position within the declaring interface
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Member name
    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    /// Method or accessor
    pub fn kind(&self) -> MemberKind {
        self.spec.kind
    }

    /// Receiver borrow
    pub fn receiver(&self) -> Receiver {
        self.spec.receiver
    }

    /// Declared parameters
    pub fn params(&self) -> &[Param] {
        &self.spec.params
    }

    /// Return type as written (`()` for unit)
    pub fn returns(&self) -> &'static str {
        self.spec.returns
    }

    /// Check if the member returns unit
    pub fn returns_unit(&self) -> bool {
        self.spec.returns_unit
    }

    /// Type-appropriate default result
    pub fn fallback(&self) -> Value {
        (self.spec.fallback)()
    }

    /// Identity shared across every table including this member
    pub(crate) fn key(&self) -> (TypeId, usize) {
        (self.declaring, self.slot)
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("index", &self.index)
            .field("interface", &self.interface)
            .field("name", &self.spec.name)
            .field("kind", &self.spec.kind)
            .field("receiver", &self.spec.receiver)
            .finish()
    }
}

impl fmt::Display for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.interface, self.spec.name)
    }
}
