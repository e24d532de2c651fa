//! Property tests: a pass-through proxy is observably the target

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use veneer::{interface, Proxy};

#[interface]
pub trait Mixer {
    fn mix(&self, a: i64, b: i64, weight: f64) -> f64;
    fn label(&self, prefix: &str, n: u16) -> String;
    fn pick(&self, items: Vec<i32>, at: usize) -> Option<i32>;
}

#[derive(Default)]
struct Counting {
    calls: Cell<usize>,
}

impl Mixer for Counting {
    fn mix(&self, a: i64, b: i64, weight: f64) -> f64 {
        self.calls.set(self.calls.get() + 1);
        a as f64 * weight + b as f64 * (1.0 - weight)
    }

    fn label(&self, prefix: &str, n: u16) -> String {
        self.calls.set(self.calls.get() + 1);
        format!("{}-{}", prefix, n)
    }

    fn pick(&self, items: Vec<i32>, at: usize) -> Option<i32> {
        self.calls.set(self.calls.get() + 1);
        items.get(at).copied()
    }
}

proptest! {
    #[test]
    fn test_mix_matches_direct_call(a in any::<i64>(), b in any::<i64>(), weight in 0.0f64..1.0) {
        let direct = Counting::default().mix(a, b, weight);
        let proxy = Proxy::passthrough(Box::new(Counting::default()) as Box<dyn Mixer>).unwrap();
        let proxied = proxy.instance().mix(a, b, weight);
        prop_assert_eq!(direct.to_bits(), proxied.to_bits());
    }

    #[test]
    fn test_label_matches_direct_call(prefix in "[a-z]{0,12}", n in any::<u16>()) {
        let direct = Counting::default().label(&prefix, n);
        let proxy = Proxy::passthrough(Box::new(Counting::default()) as Box<dyn Mixer>).unwrap();
        prop_assert_eq!(proxy.instance().label(&prefix, n), direct);
    }

    #[test]
    fn test_pick_matches_direct_call(items in prop::collection::vec(any::<i32>(), 0..16), at in 0usize..20) {
        let direct = Counting::default().pick(items.clone(), at);
        let proxy = Proxy::passthrough(Box::new(Counting::default()) as Box<dyn Mixer>).unwrap();
        prop_assert_eq!(proxy.instance().pick(items, at), direct);
    }

    #[test]
    fn test_one_target_call_per_proxy_call(n in 1usize..32) {
        let target = Rc::new(Counting::default());
        let proxy = Proxy::passthrough(Box::new(Forward(target.clone())) as Box<dyn Mixer>).unwrap();
        for i in 0..n {
            proxy.instance().pick(vec![1, 2, 3], i);
        }
        prop_assert_eq!(target.calls.get(), n);
    }
}

#[interface]
pub trait Layered {
    fn nested(&self, value: Option<Option<i32>>) -> Option<Option<i32>>;
    fn marker(&self, present: bool) -> Option<()>;
}

struct Echo;

impl Layered for Echo {
    fn nested(&self, value: Option<Option<i32>>) -> Option<Option<i32>> {
        value
    }

    fn marker(&self, present: bool) -> Option<()> {
        present.then_some(())
    }
}

proptest! {
    #[test]
    fn test_nested_option_matches_direct_call(value in proptest::option::of(proptest::option::of(any::<i32>()))) {
        let proxy = Proxy::passthrough(Box::new(Echo) as Box<dyn Layered>).unwrap();
        prop_assert_eq!(proxy.instance().nested(value), Echo.nested(value));
    }
}

#[test]
fn test_present_empty_values_are_not_dropped() {
    let proxy = Proxy::passthrough(Box::new(Echo) as Box<dyn Layered>).unwrap();
    assert_eq!(proxy.instance().nested(Some(None)), Some(None));
    assert_eq!(proxy.instance().nested(None), None);
    assert_eq!(proxy.instance().marker(true), Some(()));
    assert_eq!(proxy.instance().marker(false), None);
}

/// Lets the test keep a handle on the target the proxy owns
struct Forward(Rc<Counting>);

impl Mixer for Forward {
    fn mix(&self, a: i64, b: i64, weight: f64) -> f64 {
        self.0.mix(a, b, weight)
    }

    fn label(&self, prefix: &str, n: u16) -> String {
        self.0.label(prefix, n)
    }

    fn pick(&self, items: Vec<i32>, at: usize) -> Option<i32> {
        self.0.pick(items, at)
    }
}
