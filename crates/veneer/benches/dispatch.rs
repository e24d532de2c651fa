use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parking_lot::Mutex;
use veneer::{interface, Arguments, Handler, MemberDescriptor, PassThrough, Proxy, Value};

#[interface]
pub trait Arith {
    fn add(&self, a: i64, b: i64) -> i64;
    fn sum(&self, values: Vec<i64>) -> i64;
}

struct Plain;

impl Arith for Plain {
    fn add(&self, a: i64, b: i64) -> i64 {
        a.wrapping_add(b)
    }

    fn sum(&self, values: Vec<i64>) -> i64 {
        values.iter().fold(0i64, |acc, v| acc.wrapping_add(*v))
    }
}

#[derive(Default)]
struct Counter {
    calls: Mutex<u64>,
}

impl Handler<dyn Arith> for Counter {
    fn after_call(&self, _member: &MemberDescriptor, _args: &Arguments, _result: &Value) {
        *self.calls.lock() += 1;
    }
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    let direct: Box<dyn Arith> = Box::new(Plain);
    group.bench_function("direct", |b| {
        b.iter(|| direct.add(black_box(2), black_box(3)));
    });

    let passthrough = Proxy::passthrough(Box::new(Plain) as Box<dyn Arith>).unwrap();
    group.bench_function("passthrough", |b| {
        b.iter(|| passthrough.instance().add(black_box(2), black_box(3)));
    });

    let counted = Proxy::<dyn Arith, _>::with_target(Counter::default(), Box::new(Plain)).unwrap();
    group.bench_function("counting_handler", |b| {
        b.iter(|| counted.instance().add(black_box(2), black_box(3)));
    });

    let empty = Proxy::<dyn Arith, _>::new(PassThrough).unwrap();
    group.bench_function("no_target", |b| {
        b.iter(|| empty.instance().add(black_box(2), black_box(3)));
    });

    let mut dynamic = Proxy::passthrough(Box::new(Plain) as Box<dyn Arith>).unwrap();
    group.bench_function("invoke", |b| {
        b.iter(|| {
            dynamic
                .controller_mut()
                .invoke(0, Arguments::new().with(black_box(2i64)).with(black_box(3i64)))
                .unwrap()
        });
    });

    group.finish();
}

fn bench_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum");
    let proxy = Proxy::passthrough(Box::new(Plain) as Box<dyn Arith>).unwrap();

    for len in [1usize, 16, 256] {
        let values: Vec<i64> = (0..len as i64).collect();
        group.bench_with_input(BenchmarkId::new("passthrough", len), &values, |b, values| {
            b.iter(|| proxy.instance().sum(black_box(values.clone())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_add, bench_sum);
criterion_main!(benches);
