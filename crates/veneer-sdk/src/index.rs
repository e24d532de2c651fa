//! Member index and per-interface table
//!
//! The index assigns every member reachable through an interface a dense
//! position `0..N`: the interface's own members in declaration order, then
//! each direct base's flattened members in base order. A member reachable
//! along several inheritance paths (a diamond) is indexed once.

use std::any::TypeId;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::descriptor::{InterfaceDescriptor, MemberDescriptor, MemberKind, MemberSpec, Receiver, TypeKind};
use crate::error::{ProxyError, ProxyResult};

/// Dense, ordered mapping from index to member descriptor
#[derive(Debug, Clone, Default)]
pub struct MemberIndex {
    members: Vec<MemberDescriptor>,
}

impl MemberIndex {
    /// Build the index of `descriptor` given its already-resolved bases.
    ///
    /// Fails with `NotAnInterface` when the descriptor does not describe an
    /// interface, and with `UnsupportedMember` for malformed accessors,
    /// duplicate member names or a base that is the interface itself.
    pub fn build(descriptor: &InterfaceDescriptor, bases: &[Arc<InterfaceTable>]) -> ProxyResult<Self> {
        if descriptor.kind != TypeKind::Interface {
            return Err(ProxyError::NotAnInterface {
                name: descriptor.name.to_string(),
                kind: descriptor.kind,
            });
        }

        if let Some(base) = bases.iter().find(|b| b.id == descriptor.id) {
            return Err(unsupported(descriptor.name, base.name, "an interface cannot inherit from itself"));
        }

        let mut names = FxHashSet::default();
        for spec in &descriptor.members {
            validate_member(descriptor.name, spec)?;
            if !names.insert(spec.name) {
                return Err(unsupported(descriptor.name, spec.name, "declared more than once"));
            }
        }

        let mut members = Vec::with_capacity(descriptor.members.len());
        let mut seen = FxHashSet::default();

        for (slot, spec) in descriptor.members.iter().enumerate() {
            seen.insert((descriptor.id, slot));
            members.push(MemberDescriptor {
                index: members.len(),
                declaring: descriptor.id,
                interface: descriptor.name,
                slot,
                spec: spec.clone(),
            });
        }

        for base in bases {
            for inherited in base.members().iter() {
                if !seen.insert(inherited.key()) {
                    continue;
                }
                let mut member = inherited.clone();
                member.index = members.len();
                members.push(member);
            }
        }

        Ok(MemberIndex { members })
    }

    /// Member at `index`
    pub fn lookup(&self, index: usize) -> Option<&MemberDescriptor> {
        self.members.get(index)
    }

    /// First member named `name`, own members before inherited ones
    pub fn find(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name() == name)
    }

    /// Number of indexed members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate in index order
    pub fn iter(&self) -> std::slice::Iter<'_, MemberDescriptor> {
        self.members.iter()
    }
}

fn unsupported(interface: &str, member: &str, reason: &str) -> ProxyError {
    ProxyError::UnsupportedMember {
        interface: interface.to_string(),
        member: member.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_member(interface: &str, spec: &MemberSpec) -> ProxyResult<()> {
    match spec.kind {
        MemberKind::Method => Ok(()),
        MemberKind::Getter { .. } => {
            if !spec.params.is_empty() {
                Err(unsupported(interface, spec.name, "property getter takes no parameters"))
            } else if spec.returns_unit {
                Err(unsupported(interface, spec.name, "property getter must return a value"))
            } else if spec.receiver != Receiver::Shared {
                Err(unsupported(interface, spec.name, "property getter must take `&self`"))
            } else {
                Ok(())
            }
        }
        MemberKind::Setter { .. } => {
            if spec.params.len() != 1 {
                Err(unsupported(interface, spec.name, "property setter takes exactly one parameter"))
            } else if !spec.returns_unit {
                Err(unsupported(interface, spec.name, "property setter must return `()`"))
            } else {
                Ok(())
            }
        }
    }
}

/// Everything synthesized for one interface, built once and shared.
#[derive(Debug)]
pub struct InterfaceTable {
    id: TypeId,
    name: &'static str,
    module: Option<&'static str>,
    bases: Vec<&'static str>,
    index: MemberIndex,
    own: usize,
    /// Flattened index of every member, keyed by declaring interface, by slot
    declared: FxHashMap<TypeId, Vec<usize>>,
    expansion: Option<&'static str>,
}

impl InterfaceTable {
    /// Validate and index `descriptor` against its resolved bases
    pub fn build(descriptor: InterfaceDescriptor, bases: &[Arc<InterfaceTable>]) -> ProxyResult<Self> {
        let index = MemberIndex::build(&descriptor, bases)?;

        let mut declared: FxHashMap<TypeId, Vec<usize>> = FxHashMap::default();
        for member in index.iter() {
            let slots = declared.entry(member.declaring).or_default();
            if slots.len() <= member.slot {
                slots.resize(member.slot + 1, usize::MAX);
            }
            slots[member.slot] = member.index;
        }
        // Bases without members of their own still count as reachable
        for base in bases {
            for id in base.declared.keys() {
                declared.entry(*id).or_default();
            }
            declared.entry(base.id).or_default();
        }
        declared.entry(descriptor.id).or_default();

        Ok(InterfaceTable {
            id: descriptor.id,
            name: descriptor.name,
            module: descriptor.module,
            bases: descriptor.bases.iter().map(|b| b.name).collect(),
            own: descriptor.members.len(),
            index,
            declared,
            expansion: descriptor.expansion,
        })
    }

    /// Interface type id
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Interface name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declaring module, when recorded
    pub fn module(&self) -> Option<&'static str> {
        self.module
    }

    /// `module::Name`, or the bare name when no module was recorded
    pub fn path(&self) -> String {
        match self.module {
            Some(module) => format!("{}::{}", module, self.name),
            None => self.name.to_string(),
        }
    }

    /// Names of the direct bases, in declaration order
    pub fn bases(&self) -> &[&'static str] {
        &self.bases
    }

    /// The member index
    pub fn members(&self) -> &MemberIndex {
        &self.index
    }

    /// Number of members declared by the interface itself
    pub fn own_len(&self) -> usize {
        self.own
    }

    /// Generated source, when captured
    pub fn expansion(&self) -> Option<&'static str> {
        self.expansion
    }

    /// Member at a flattened index
    pub fn lookup(&self, index: usize) -> ProxyResult<&MemberDescriptor> {
        self.index.lookup(index).ok_or_else(|| ProxyError::IndexOutOfRange {
            interface: self.name.to_string(),
            index,
            len: self.index.len(),
        })
    }

    /// Member declared at `slot` of interface `declaring`
    #[inline]
    pub fn resolve(&self, declaring: TypeId, slot: usize) -> ProxyResult<&MemberDescriptor> {
        // Own members occupy the first positions in declaration order
        if declaring == self.id && slot < self.own {
            return self.lookup(slot);
        }
        self.declared
            .get(&declaring)
            .and_then(|slots| slots.get(slot))
            .and_then(|&index| self.index.lookup(index))
            .ok_or_else(|| ProxyError::UnknownSlot {
                interface: self.name.to_string(),
                declaring: self.declaring_name(declaring),
                slot,
            })
    }

    /// Check if members of interface `id` are reachable through this table
    pub fn reaches(&self, id: TypeId) -> bool {
        self.declared.contains_key(&id)
    }

    fn declaring_name(&self, id: TypeId) -> String {
        self.index
            .iter()
            .find(|m| m.declaring == id)
            .map(|m| m.interface.to_string())
            .unwrap_or_else(|| format!("{:?}", id))
    }
}
