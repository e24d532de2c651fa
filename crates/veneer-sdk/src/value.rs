//! Value — uniform dynamic representation of call arguments and results
//!
//! Every argument handed to a forwarding body is boxed into a `Value` before
//! the call reaches the controller, and every result travels back the same
//! way. Primitive and string values get their own variants so handlers can
//! inspect and rewrite them; user types ride in `Opaque`.
//!
//! ```text
//! Absent            unit results, `None`, "no value"
//! Bool .. F64       primitives, one variant per width
//! Str / List        owned strings and sequences
//! Result            `Ok` / `Err` of a fallible member
//! Opaque            Arc<dyn Any + Send + Sync> plus the type name
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Dynamic value carried through the interception pipeline.
///
/// Cloning is cheap for every variant except `Str` and `List`; `Opaque`
/// payloads are shared.
#[derive(Clone, Default)]
pub enum Value {
    /// No value (unit return, `None`)
    #[default]
    Absent,
    /// Present optional value, kept apart from its payload so that
    /// `Some(None)` and `Some(())` survive the trip
    Some(Box<Value>),
    /// Boolean
    Bool(bool),
    /// Unicode scalar
    Char(char),
    /// 8-bit signed integer
    I8(i8),
    /// 16-bit signed integer
    I16(i16),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 128-bit signed integer
    I128(i128),
    /// Pointer-sized signed integer
    Isize(isize),
    /// 8-bit unsigned integer
    U8(u8),
    /// 16-bit unsigned integer
    U16(u16),
    /// 32-bit unsigned integer
    U32(u32),
    /// 64-bit unsigned integer
    U64(u64),
    /// 128-bit unsigned integer
    U128(u128),
    /// Pointer-sized unsigned integer
    Usize(usize),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// Owned string
    Str(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Outcome of a fallible member
    Result(Result<Box<Value>, Box<Value>>),
    /// Any other `Clone + Send + Sync` type
    Opaque(Opaque),
}

/// Type-erased user value.
#[derive(Clone, Debug)]
pub struct Opaque {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Opaque {
    /// Box a value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Opaque {
            type_name: std::any::type_name::<T>(),
            inner: Arc::new(value),
        }
    }

    /// Name of the boxed type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the payload if it is a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Check the payload type
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Take the payload out, cloning only if it is still shared
    pub fn take<T: Any + Send + Sync + Clone>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        match Arc::downcast::<T>(self.inner) {
            Ok(arc) => Ok(Arc::try_unwrap(arc).unwrap_or_else(|shared| (*shared).clone())),
            Err(inner) => Err(Opaque { type_name, inner }),
        }
    }
}

impl Value {
    /// Box a user value
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Opaque(Opaque::new(value))
    }

    /// Check for `Absent`
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Extract a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract an i32
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract an i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract an f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow a sequence
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow an opaque payload as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(o) => o.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Get type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Some(_) => "Some",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::I128(_) => "i128",
            Value::Isize(_) => "isize",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::U128(_) => "u128",
            Value::Usize(_) => "usize",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Str(_) => "String",
            Value::List(_) => "list",
            Value::Result(Ok(_)) => "Ok",
            Value::Result(Err(_)) => "Err",
            Value::Opaque(o) => o.type_name(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Absent, Absent) => true,
            (Value::Some(a), Value::Some(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (I8(a), I8(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (I128(a), I128(b)) => a == b,
            (Isize(a), Isize(b)) => a == b,
            (U8(a), U8(b)) => a == b,
            (U16(a), U16(b)) => a == b,
            (U32(a), U32(b)) => a == b,
            (U64(a), U64(b)) => a == b,
            (U128(a), U128(b)) => a == b,
            (Usize(a), Usize(b)) => a == b,
            (F32(a), F32(b)) => a == b,
            (F64(a), F64(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Value::Result(a), Value::Result(b)) => a == b,
            // Opaque payloads compare by identity
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "Absent"),
            Value::Some(v) => write!(f, "Some({:?})", v),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{:?}", c),
            Value::I8(i) => write!(f, "{}i8", i),
            Value::I16(i) => write!(f, "{}i16", i),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}i64", i),
            Value::I128(i) => write!(f, "{}i128", i),
            Value::Isize(i) => write!(f, "{}isize", i),
            Value::U8(u) => write!(f, "{}u8", u),
            Value::U16(u) => write!(f, "{}u16", u),
            Value::U32(u) => write!(f, "{}u32", u),
            Value::U64(u) => write!(f, "{}u64", u),
            Value::U128(u) => write!(f, "{}u128", u),
            Value::Usize(u) => write!(f, "{}usize", u),
            Value::F32(x) => write!(f, "{}f32", x),
            Value::F64(x) => write!(f, "{}f64", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Result(Ok(v)) => write!(f, "Ok({:?})", v),
            Value::Result(Err(e)) => write!(f, "Err({:?})", e),
            Value::Opaque(o) => write!(f, "<{}>", o.type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_absent_is_default() {
        let v = Value::default();
        assert!(v.is_absent());
        assert_eq!(v.type_name(), "absent");
    }

    #[test]
    fn test_primitive_accessors() {
        assert_eq!(Value::I32(42).as_i32(), Some(42));
        assert_eq!(Value::I32(42).as_i64(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Str("hi".into()).as_str(), Some("hi"));
        assert!((Value::F64(2.5).as_f64().unwrap() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_present_absent_is_not_absent() {
        let some_unit = Value::Some(Box::new(Value::Absent));
        assert_ne!(some_unit, Value::Absent);
        assert!(!some_unit.is_absent());
        assert_eq!(some_unit.type_name(), "Some");
        assert_eq!(format!("{:?}", some_unit), "Some(Absent)");
    }

    #[test]
    fn test_widths_are_distinct() {
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_ne!(Value::U8(1), Value::I8(1));
        assert_eq!(Value::U64(7), Value::U64(7));
    }

    #[test]
    fn test_opaque_downcast_and_take() {
        let v = Value::opaque(Point { x: 1, y: 2 });
        assert_eq!(v.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
        assert!(v.downcast_ref::<String>().is_none());
        assert!(v.type_name().ends_with("Point"));

        let shared = v.clone();
        let Value::Opaque(o) = v else { panic!("expected opaque") };
        // Still shared with `shared`, so `take` clones
        assert_eq!(o.take::<Point>().unwrap(), Point { x: 1, y: 2 });
        assert!(shared.downcast_ref::<Point>().is_some());
    }

    #[test]
    fn test_opaque_take_wrong_type_returns_self() {
        let Value::Opaque(o) = Value::opaque(5u8) else { panic!("expected opaque") };
        let back = o.take::<String>().unwrap_err();
        assert!(back.is::<u8>());
    }

    #[test]
    fn test_opaque_equality_is_identity() {
        let a = Value::opaque(Point { x: 0, y: 0 });
        let b = Value::opaque(Point { x: 0, y: 0 });
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_format() {
        let v = Value::List(vec![Value::I32(1), Value::Str("a".into()), Value::Absent]);
        assert_eq!(format!("{:?}", v), "[1, \"a\", Absent]");
        let r = Value::Result(Err(Box::new(Value::Str("boom".into()))));
        assert_eq!(format!("{:?}", r), "Err(\"boom\")");
    }
}
