//! Process-wide cache of synthesized interface tables
//!
//! Each interface type is synthesized at most once. The map lock is only
//! held to find or insert the per-type cell; synthesis itself runs inside the
//! cell, so concurrent first users of one interface block until it finishes
//! while other interfaces proceed independently. Failures are cached too.

use std::any::TypeId;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::descriptor::{InterfaceDescriptor, MemberDescriptor};
use crate::error::{ProxyError, ProxyResult};
use crate::index::InterfaceTable;
use crate::interface::Interface;

type Synthesized = Arc<OnceCell<ProxyResult<Arc<InterfaceTable>>>>;

static REGISTRY: Lazy<RwLock<FxHashMap<TypeId, Synthesized>>> = Lazy::new(|| RwLock::new(FxHashMap::default()));

fn cell(id: TypeId) -> Synthesized {
    if let Some(cell) = REGISTRY.read().get(&id) {
        return cell.clone();
    }
    REGISTRY.write().entry(id).or_default().clone()
}

/// Table of interface `I`, synthesizing it on first use
pub fn resolve<I: ?Sized + Interface>() -> ProxyResult<Arc<InterfaceTable>> {
    cell(TypeId::of::<I>()).get_or_init(|| synthesize(I::descriptor())).clone()
}

/// Member of interface `I` at flattened `index`
pub fn lookup<I: ?Sized + Interface>(index: usize) -> ProxyResult<MemberDescriptor> {
    resolve::<I>()?.lookup(index).cloned()
}

/// Check if members declared by `declaring` are reachable through `I`
pub fn reaches<I: ?Sized + Interface>(declaring: TypeId) -> ProxyResult<bool> {
    Ok(resolve::<I>()?.reaches(declaring))
}

/// Check if `I` has been synthesized (successfully or not)
pub fn is_synthesized<I: ?Sized + Interface>() -> bool {
    REGISTRY
        .read()
        .get(&TypeId::of::<I>())
        .is_some_and(|cell| cell.get().is_some())
}

fn synthesize(descriptor: InterfaceDescriptor) -> ProxyResult<Arc<InterfaceTable>> {
    let name = descriptor.name;
    debug!(interface = name, declared = descriptor.members.len(), "synthesizing proxy table");

    // Must run before any base is resolved: resolving an interface from
    // inside its own synthesis would never return
    let outcome = check_acyclic(&descriptor)
        .and_then(|()| {
            descriptor
                .bases
                .iter()
                .map(|base| (base.resolve)())
                .collect::<ProxyResult<Vec<_>>>()
        })
        .and_then(|bases| InterfaceTable::build(descriptor, &bases));

    match outcome {
        Ok(table) => {
            debug!(interface = name, members = table.members().len(), "proxy table ready");
            if let Some(dir) = crate::config::dump_dir() {
                if let Err(e) = crate::diagnostics::write_table(&table, &dir) {
                    warn!(interface = name, error = %e, "could not dump proxy table");
                }
            }
            Ok(Arc::new(table))
        }
        Err(e) => {
            warn!(interface = name, error = %e, "proxy synthesis failed; failure is cached");
            Err(e)
        }
    }
}

/// Reject inheritance that leads back to `descriptor`
fn check_acyclic(descriptor: &InterfaceDescriptor) -> ProxyResult<()> {
    let mut visited = FxHashSet::default();
    let mut pending: Vec<_> = descriptor.bases.iter().map(|b| (b.name, b.clone())).collect();
    while let Some((direct, base)) = pending.pop() {
        if base.id == descriptor.id {
            return Err(ProxyError::UnsupportedMember {
                interface: descriptor.name.to_string(),
                member: direct.to_string(),
                reason: format!("base `{}` inherits from `{}` again", direct, descriptor.name),
            });
        }
        if visited.insert(base.id) {
            pending.extend((base.describe)().bases.into_iter().map(|b| (direct, b)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    use crate::args::Arguments;
    use crate::descriptor::{MemberSpec, Receiver, TypeKind};
    use crate::interface::Target;
    use crate::value::Value;

    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    trait Counted {}

    impl Interface for dyn Counted {
        fn descriptor() -> InterfaceDescriptor {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            InterfaceDescriptor::interface::<dyn Counted>("Counted")
                .member(MemberSpec::method("tick", Receiver::Shared).returns::<u64>("u64"))
        }

        fn dispatch(_: Target<'_, Self>, member: &MemberDescriptor, _: &Arguments) -> ProxyResult<Value> {
            Ok(member.fallback())
        }
    }

    static BROKEN_BUILDS: AtomicUsize = AtomicUsize::new(0);

    trait Broken {}

    impl Interface for dyn Broken {
        fn descriptor() -> InterfaceDescriptor {
            BROKEN_BUILDS.fetch_add(1, Ordering::SeqCst);
            InterfaceDescriptor::of_kind::<dyn Broken>("Broken", TypeKind::Value)
        }

        fn dispatch(_: Target<'_, Self>, member: &MemberDescriptor, _: &Arguments) -> ProxyResult<Value> {
            Ok(member.fallback())
        }
    }

    trait Child {}

    impl Interface for dyn Child {
        fn descriptor() -> InterfaceDescriptor {
            InterfaceDescriptor::interface::<dyn Child>("Child").extends::<dyn Broken>("Broken")
        }

        fn dispatch(_: Target<'_, Self>, member: &MemberDescriptor, _: &Arguments) -> ProxyResult<Value> {
            Ok(member.fallback())
        }
    }

    #[test]
    fn test_concurrent_first_use_synthesizes_once() {
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    resolve::<dyn Counted>().unwrap()
                })
            })
            .collect();
        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        for table in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], table));
        }
        assert!(is_synthesized::<dyn Counted>());
        assert_eq!(lookup::<dyn Counted>(0).unwrap().name(), "tick");
    }

    #[test]
    fn test_failure_is_cached() {
        let first = resolve::<dyn Broken>().unwrap_err();
        let second = resolve::<dyn Broken>().unwrap_err();
        assert_eq!(first, second);
        assert!(matches!(first, ProxyError::NotAnInterface { kind: TypeKind::Value, .. }));
        assert_eq!(BROKEN_BUILDS.load(Ordering::SeqCst), 1);
    }

    trait Loop {}

    impl Interface for dyn Loop {
        fn descriptor() -> InterfaceDescriptor {
            InterfaceDescriptor::interface::<dyn Loop>("Loop")
                .member(MemberSpec::method("spin", Receiver::Shared))
                .extends::<dyn Loop>("Loop")
        }

        fn dispatch(_: Target<'_, Self>, member: &MemberDescriptor, _: &Arguments) -> ProxyResult<Value> {
            Ok(member.fallback())
        }
    }

    trait Ping {}
    trait Pong {}

    impl Interface for dyn Ping {
        fn descriptor() -> InterfaceDescriptor {
            InterfaceDescriptor::interface::<dyn Ping>("Ping").extends::<dyn Pong>("Pong")
        }

        fn dispatch(_: Target<'_, Self>, member: &MemberDescriptor, _: &Arguments) -> ProxyResult<Value> {
            Ok(member.fallback())
        }
    }

    impl Interface for dyn Pong {
        fn descriptor() -> InterfaceDescriptor {
            InterfaceDescriptor::interface::<dyn Pong>("Pong").extends::<dyn Ping>("Ping")
        }

        fn dispatch(_: Target<'_, Self>, member: &MemberDescriptor, _: &Arguments) -> ProxyResult<Value> {
            Ok(member.fallback())
        }
    }

    #[test]
    fn test_self_inheritance_is_rejected() {
        let err = resolve::<dyn Loop>().unwrap_err();
        assert_eq!(
            err,
            ProxyError::UnsupportedMember {
                interface: "Loop".into(),
                member: "Loop".into(),
                reason: "base `Loop` inherits from `Loop` again".into(),
            }
        );
        assert!(is_synthesized::<dyn Loop>());
    }

    #[test]
    fn test_inheritance_cycle_is_rejected() {
        let err = resolve::<dyn Ping>().unwrap_err();
        assert!(matches!(err, ProxyError::UnsupportedMember { .. }), "{err}");
        assert!(resolve::<dyn Pong>().is_err());
    }

    #[test]
    fn test_base_failure_fails_derived() {
        let err = resolve::<dyn Child>().unwrap_err();
        assert!(matches!(err, ProxyError::NotAnInterface { .. }));
        assert!(is_synthesized::<dyn Child>());
    }
}
