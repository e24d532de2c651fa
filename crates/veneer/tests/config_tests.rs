//! Configuration tests
//!
//! Runs in its own process, so installing a process-wide configuration here
//! does not leak into other test binaries.

use veneer::{config, interface, Config, PassThrough, Proxy};

#[interface]
pub trait Gauge {
    fn ping(&self) -> bool;
}

#[test]
fn test_installed_dump_dir_dumps_on_first_synthesis() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Config::from_toml_str(&format!(
        "dump_dir = {:?}\ntrace_calls = true\n",
        dir.path().display().to_string()
    ))
    .unwrap();
    config::install(cfg.clone());
    assert_eq!(config::current(), cfg);

    let proxy = Proxy::<dyn Gauge, _>::new(PassThrough).unwrap();
    assert!(!proxy.instance().ping());
    assert!(dir.path().join("config_tests.Gauge.members.json").exists());
}
