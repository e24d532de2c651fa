//! Remote calls: a handler that ships each call as a JSON envelope, and a
//! dispatcher that runs envelopes against a local controller.
//!
//! ```ignore
//! let server = Arc::new(Dispatcher::new(Controller::with_target(PassThrough, Box::new(Real))?));
//! let client = Proxy::<dyn Store, _>::new(RemoteHandler::new(Loopback::new(server)))?;
//! client.instance().get("key"); // runs on `Real` behind the dispatcher
//! ```
//!
//! Only plain data crosses the wire; `Value::Opaque` arguments or results
//! fail the call.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use veneer::{Arguments, Controller, Handler, Interface, MemberDescriptor, ProxyError, ProxyResult, Target, Value};

/// Remote call failure
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("value of type `{0}` cannot be sent")]
    Opaque(&'static str),

    #[error("malformed message: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("{0} out of range on this platform")]
    Range(String),

    #[error("envelope names `{sent}` but member {index} is `{found}`")]
    Mismatch { sent: String, index: usize, found: String },

    #[error("remote call failed: {0}")]
    Remote(String),

    #[error("transport failed: {0}")]
    Transport(String),
}

impl From<RemoteError> for ProxyError {
    fn from(err: RemoteError) -> Self {
        ProxyError::Handler(err.to_string())
    }
}

/// Serialized form of a [`Value`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Wire {
    Absent,
    Some(Box<Wire>),
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    /// Decimal text; JSON numbers lose 128-bit precision
    I128(String),
    Isize(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(String),
    Usize(u64),
    F32(f32),
    F64(f64),
    Str(String),
    List(Vec<Wire>),
    Ok(Box<Wire>),
    Err(Box<Wire>),
}

impl TryFrom<&Value> for Wire {
    type Error = RemoteError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Absent => Wire::Absent,
            Value::Some(v) => Wire::Some(Box::new(Wire::try_from(&**v)?)),
            Value::Bool(v) => Wire::Bool(*v),
            Value::Char(v) => Wire::Char(*v),
            Value::I8(v) => Wire::I8(*v),
            Value::I16(v) => Wire::I16(*v),
            Value::I32(v) => Wire::I32(*v),
            Value::I64(v) => Wire::I64(*v),
            Value::I128(v) => Wire::I128(v.to_string()),
            Value::Isize(v) => Wire::Isize(*v as i64),
            Value::U8(v) => Wire::U8(*v),
            Value::U16(v) => Wire::U16(*v),
            Value::U32(v) => Wire::U32(*v),
            Value::U64(v) => Wire::U64(*v),
            Value::U128(v) => Wire::U128(v.to_string()),
            Value::Usize(v) => Wire::Usize(*v as u64),
            Value::F32(v) => Wire::F32(*v),
            Value::F64(v) => Wire::F64(*v),
            Value::Str(v) => Wire::Str(v.clone()),
            Value::List(items) => Wire::List(items.iter().map(Wire::try_from).collect::<Result<_, _>>()?),
            Value::Result(Ok(v)) => Wire::Ok(Box::new(Wire::try_from(&**v)?)),
            Value::Result(Err(v)) => Wire::Err(Box::new(Wire::try_from(&**v)?)),
            Value::Opaque(o) => return Err(RemoteError::Opaque(o.type_name())),
        })
    }
}

impl TryFrom<Wire> for Value {
    type Error = RemoteError;

    fn try_from(wire: Wire) -> Result<Self, Self::Error> {
        Ok(match wire {
            Wire::Absent => Value::Absent,
            Wire::Some(v) => Value::Some(Box::new(Value::try_from(*v)?)),
            Wire::Bool(v) => Value::Bool(v),
            Wire::Char(v) => Value::Char(v),
            Wire::I8(v) => Value::I8(v),
            Wire::I16(v) => Value::I16(v),
            Wire::I32(v) => Value::I32(v),
            Wire::I64(v) => Value::I64(v),
            Wire::I128(text) => Value::I128(text.parse().map_err(|_| RemoteError::Range(text))?),
            Wire::Isize(v) => Value::Isize(isize::try_from(v).map_err(|_| RemoteError::Range(v.to_string()))?),
            Wire::U8(v) => Value::U8(v),
            Wire::U16(v) => Value::U16(v),
            Wire::U32(v) => Value::U32(v),
            Wire::U64(v) => Value::U64(v),
            Wire::U128(text) => Value::U128(text.parse().map_err(|_| RemoteError::Range(text))?),
            Wire::Usize(v) => Value::Usize(usize::try_from(v).map_err(|_| RemoteError::Range(v.to_string()))?),
            Wire::F32(v) => Value::F32(v),
            Wire::F64(v) => Value::F64(v),
            Wire::Str(v) => Value::Str(v),
            Wire::List(items) => Value::List(items.into_iter().map(Value::try_from).collect::<Result<_, _>>()?),
            Wire::Ok(v) => Value::Result(Ok(Box::new(Value::try_from(*v)?))),
            Wire::Err(v) => Value::Result(Err(Box::new(Value::try_from(*v)?))),
        })
    }
}

/// One call on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Declaring interface of the member
    pub interface: String,
    /// Member name
    pub member: String,
    /// Flattened index in the proxied interface
    pub index: usize,
    /// Arguments in declaration order
    pub args: Vec<Wire>,
}

impl Envelope {
    /// Capture a call
    pub fn capture(member: &MemberDescriptor, args: &Arguments) -> Result<Self, RemoteError> {
        Ok(Envelope {
            interface: member.interface().to_string(),
            member: member.name().to_string(),
            index: member.index(),
            args: args.iter().map(Wire::try_from).collect::<Result<_, _>>()?,
        })
    }
}

/// Outcome of one call on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum Reply {
    Ok(Wire),
    Err(String),
}

/// Carries a serialized envelope to a dispatcher and returns its reply
pub trait Transport {
    fn send(&self, request: &str) -> Result<String, RemoteError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &str) -> Result<String, RemoteError> {
        (**self).send(request)
    }
}

/// Handler that runs every call remotely.
///
/// A local target, if any, is never consulted.
pub struct RemoteHandler<T> {
    transport: T,
}

impl<T: Transport> RemoteHandler<T> {
    pub fn new(transport: T) -> Self {
        RemoteHandler { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call(&self, member: &MemberDescriptor, args: &Arguments) -> Result<Value, RemoteError> {
        let request = serde_json::to_string(&Envelope::capture(member, args)?)?;
        debug!(member = %member, bytes = request.len(), "sending call");
        let response = self.transport.send(&request)?;
        match serde_json::from_str::<Reply>(&response)? {
            Reply::Ok(wire) => Value::try_from(wire),
            Reply::Err(message) => Err(RemoteError::Remote(message)),
        }
    }
}

impl<I: ?Sized + Interface, T: Transport> Handler<I> for RemoteHandler<T> {
    fn on_call(&self, _target: Target<'_, I>, member: &MemberDescriptor, args: &Arguments) -> ProxyResult<Value> {
        Ok(self.call(member, args)?)
    }
}

/// Runs incoming envelopes against a controller
pub struct Dispatcher<I: ?Sized + Interface, H> {
    controller: Mutex<Controller<I, H>>,
}

impl<I: ?Sized + Interface, H: Handler<I>> Dispatcher<I, H> {
    pub fn new(controller: Controller<I, H>) -> Self {
        Dispatcher {
            controller: Mutex::new(controller),
        }
    }

    /// Handle one serialized envelope.
    ///
    /// Failures of the call itself come back as `Reply::Err`; only a request
    /// that can't be decoded is an error here.
    pub fn handle(&self, request: &str) -> Result<String, RemoteError> {
        let envelope: Envelope = serde_json::from_str(request)?;
        let reply = match self.run(envelope) {
            Ok(wire) => Reply::Ok(wire),
            Err(err) => {
                warn!(error = %err, "remote call failed");
                Reply::Err(err.to_string())
            }
        };
        Ok(serde_json::to_string(&reply)?)
    }

    fn run(&self, envelope: Envelope) -> Result<Wire, RemoteError> {
        let mut controller = self.controller.lock();
        {
            let member = controller.table().lookup(envelope.index).map_err(remote)?;
            if member.name() != envelope.member || member.interface() != envelope.interface {
                return Err(RemoteError::Mismatch {
                    sent: format!("{}::{}", envelope.interface, envelope.member),
                    index: envelope.index,
                    found: member.to_string(),
                });
            }
        }

        let args = envelope
            .args
            .into_iter()
            .map(Value::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let result = controller.invoke(envelope.index, Arguments::from(args)).map_err(remote)?;
        Wire::try_from(&result)
    }

    /// Run `f` with the controller locked
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut Controller<I, H>) -> R) -> R {
        f(&mut self.controller.lock())
    }
}

fn remote(err: ProxyError) -> RemoteError {
    RemoteError::Remote(err.to_string())
}

/// In-process transport straight into a dispatcher
pub struct Loopback<I: ?Sized + Interface, H> {
    dispatcher: Arc<Dispatcher<I, H>>,
}

impl<I: ?Sized + Interface, H: Handler<I>> Loopback<I, H> {
    pub fn new(dispatcher: Arc<Dispatcher<I, H>>) -> Self {
        Loopback { dispatcher }
    }
}

impl<I: ?Sized + Interface, H: Handler<I>> Transport for Loopback<I, H> {
    fn send(&self, request: &str) -> Result<String, RemoteError> {
        self.dispatcher.handle(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let wire = Wire::try_from(&Value::List(vec![Value::I32(1), Value::Str("a".into())])).unwrap();
        let json = serde_json::to_string(&wire).unwrap();
        assert_eq!(
            json,
            r#"{"type":"list","value":[{"type":"i32","value":1},{"type":"str","value":"a"}]}"#
        );
        assert_eq!(serde_json::to_string(&Wire::Absent).unwrap(), r#"{"type":"absent"}"#);
    }

    #[test]
    fn test_wide_integers_survive() {
        let value = Value::U128(u128::MAX);
        let wire = Wire::try_from(&value).unwrap();
        let back: Wire = serde_json::from_str(&serde_json::to_string(&wire).unwrap()).unwrap();
        assert_eq!(Value::try_from(back).unwrap(), value);
    }

    #[test]
    fn test_nested_option_survives() {
        let value = Value::Some(Box::new(Value::Absent));
        let json = serde_json::to_string(&Wire::try_from(&value).unwrap()).unwrap();
        assert_eq!(json, r#"{"type":"some","value":{"type":"absent"}}"#);
        let back: Wire = serde_json::from_str(&json).unwrap();
        assert_eq!(Value::try_from(back).unwrap(), value);
    }

    #[test]
    fn test_opaque_rejected() {
        let err = Wire::try_from(&Value::opaque(std::time::Duration::from_secs(1))).unwrap_err();
        assert!(matches!(err, RemoteError::Opaque(_)));
        assert!(ProxyError::from(err).to_string().contains("cannot be sent"));
    }

    #[test]
    fn test_bad_integer_text() {
        let err = Value::try_from(Wire::I128("twelve".into())).unwrap_err();
        assert!(matches!(err, RemoteError::Range(text) if text == "twelve"));
    }

    #[test]
    fn test_reply_format() {
        let json = serde_json::to_string(&Reply::Err("boom".into())).unwrap();
        assert_eq!(json, r#"{"status":"err","body":"boom"}"#);
    }
}
