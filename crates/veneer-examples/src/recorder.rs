//! Records calls for later inspection

use parking_lot::Mutex;
use veneer::{Arguments, Handler, Interface, MemberDescriptor, Value};

/// One completed call
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// `Interface::member` of the declaration
    pub member: String,
    /// Flattened index in the proxied interface
    pub index: usize,
    /// Arguments as dispatched
    pub args: Vec<Value>,
    /// Final result
    pub result: Value,
}

/// Records every completed call; rejected or panicking calls leave no record.
#[derive(Debug, Default)]
pub struct Recorder {
    records: Mutex<Vec<Record>>,
}

impl Recorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the records so far
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Take the records, leaving the recorder empty
    pub fn drain(&self) -> Vec<Record> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Number of recorded calls
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Names of the recorded members, in call order
    pub fn members(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.member.clone()).collect()
    }
}

impl<I: ?Sized + Interface> Handler<I> for Recorder {
    fn after_call(&self, member: &MemberDescriptor, args: &Arguments, result: &Value) {
        self.records.lock().push(Record {
            member: member.to_string(),
            index: member.index(),
            args: args.as_slice().to_vec(),
            result: result.clone(),
        });
    }
}
