//! Traits for converting between Rust types and `Value`.
//!
//! Every parameter type of an interface member must implement `IntoValue`
//! (so the forwarding body can box it) and `FromValue` (so target dispatch
//! can unbox it). Return types need both as well. Primitives, `String`,
//! `Option`, `Vec` and `Result` are covered here; user types go through
//! `opaque_value!`.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Clone, Default)]
//! struct Point { x: f64, y: f64 }
//!
//! veneer::opaque_value!(default Point);
//! ```

use crate::error::{ProxyError, ProxyResult};
use crate::value::Value;

/// Convert a Rust value into a `Value`.
pub trait IntoValue {
    /// Box into the dynamic representation
    fn into_value(self) -> Value;
}

/// Convert a `Value` back into a Rust value.
pub trait FromValue: Sized {
    /// Unbox, returning an error if the variant does not match
    fn from_value(value: Value) -> ProxyResult<Self>;

    /// Type-appropriate default used when no target answers a call
    fn fallback() -> Option<Self> {
        None
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> ProxyResult<Self> {
        Ok(value)
    }

    fn fallback() -> Option<Self> {
        Some(Value::Absent)
    }
}

// Unit results are discarded whatever the handler produced
impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Absent
    }
}

impl FromValue for () {
    fn from_value(_value: Value) -> ProxyResult<Self> {
        Ok(())
    }

    fn fallback() -> Option<Self> {
        Some(())
    }
}

macro_rules! primitive_value {
    ($($ty:ty => $variant:ident, $zero:expr;)*) => {
        $(
            impl IntoValue for $ty {
                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl FromValue for $ty {
                #[inline]
                fn from_value(value: Value) -> ProxyResult<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(ProxyError::mismatch(stringify!($ty), other.type_name())),
                    }
                }

                fn fallback() -> Option<Self> {
                    Some($zero)
                }
            }
        )*
    };
}

primitive_value! {
    bool => Bool, false;
    char => Char, '\0';
    i8 => I8, 0;
    i16 => I16, 0;
    i32 => I32, 0;
    i64 => I64, 0;
    i128 => I128, 0;
    isize => Isize, 0;
    u8 => U8, 0;
    u16 => U16, 0;
    u32 => U32, 0;
    u64 => U64, 0;
    u128 => U128, 0;
    usize => Usize, 0;
    f32 => F32, 0.0;
    f64 => F64, 0.0;
    String => Str, String::new();
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => Value::Some(Box::new(v.into_value())),
            None => Value::Absent,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> ProxyResult<Self> {
        match value {
            Value::Absent => Ok(None),
            Value::Some(v) => T::from_value(*v).map(Some),
            // A bare value can only mean `Some`
            other => T::from_value(other).map(Some),
        }
    }

    fn fallback() -> Option<Self> {
        Some(None)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> ProxyResult<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ProxyError::mismatch("list", other.type_name())),
        }
    }

    fn fallback() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: IntoValue, E: IntoValue> IntoValue for Result<T, E> {
    fn into_value(self) -> Value {
        match self {
            Ok(v) => Value::Result(Ok(Box::new(v.into_value()))),
            Err(e) => Value::Result(Err(Box::new(e.into_value()))),
        }
    }
}

impl<T: FromValue, E: FromValue> FromValue for Result<T, E> {
    fn from_value(value: Value) -> ProxyResult<Self> {
        match value {
            Value::Result(Ok(v)) => T::from_value(*v).map(Ok),
            Value::Result(Err(e)) => E::from_value(*e).map(Err),
            Value::Absent => Err(ProxyError::mismatch("Result", "absent")),
            // A bare value is read as success
            other => T::from_value(other).map(Ok),
        }
    }

    fn fallback() -> Option<Self> {
        T::fallback().map(Ok)
    }
}

/// Carry user types through `Value::Opaque`.
///
/// The types must be `Clone + Send + Sync + 'static`. With the `default`
/// prefix, `Default::default()` is used as the fallback for proxies without
/// a target; otherwise a call without a target fails with a type mismatch.
///
/// ```ignore
/// opaque_value!(Ticket, Receipt);
/// opaque_value!(default Settings);
/// ```
#[macro_export]
macro_rules! opaque_value {
    (@impl $ty:ty, $fallback:expr) => {
        impl $crate::IntoValue for $ty {
            fn into_value(self) -> $crate::Value {
                $crate::Value::opaque(self)
            }
        }

        impl $crate::FromValue for $ty {
            fn from_value(value: $crate::Value) -> $crate::ProxyResult<Self> {
                match value {
                    $crate::Value::Opaque(o) => o.take::<$ty>().map_err(|o| {
                        $crate::ProxyError::mismatch(::std::any::type_name::<$ty>(), o.type_name())
                    }),
                    other => Err($crate::ProxyError::mismatch(
                        ::std::any::type_name::<$ty>(),
                        other.type_name(),
                    )),
                }
            }

            fn fallback() -> ::std::option::Option<Self> {
                $fallback
            }
        }
    };
    (default $($ty:ty),+ $(,)?) => {
        $(
            $crate::opaque_value!(@impl $ty, ::std::option::Option::Some(<$ty as ::std::default::Default>::default()));
        )+
    };
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::opaque_value!(@impl $ty, ::std::option::Option::None);
        )+
    };
}
