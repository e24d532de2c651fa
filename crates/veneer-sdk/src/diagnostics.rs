//! Dumping synthesized tables for inspection
//!
//! For an interface `Name` declared in module `app::store`, a dump writes
//! `app.store.Name.members.json` (the member index) and, when the expansion
//! was captured (debug builds), `app.store.Name.expansion.rs` with the
//! generated code. Interfaces without a recorded module use the bare name.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::descriptor::{MemberKind, Param, Receiver};
use crate::error::{ProxyError, ProxyResult};
use crate::index::InterfaceTable;
use crate::interface::Interface;

/// Serializable view of an interface table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRecord {
    /// Interface name
    pub interface: &'static str,
    /// Declaring module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<&'static str>,
    /// Direct bases
    pub bases: Vec<&'static str>,
    /// Indexed members in index order
    pub members: Vec<MemberRecord>,
}

/// Serializable view of one indexed member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberRecord {
    /// Flattened index
    pub index: usize,
    /// Member name
    pub name: &'static str,
    /// Declaring interface
    pub declared_by: &'static str,
    /// Declared slot
    pub slot: usize,
    /// Method or accessor
    pub kind: MemberKind,
    /// Receiver borrow
    pub receiver: Receiver,
    /// Parameters
    pub params: Vec<Param>,
    /// Return type as written
    pub returns: &'static str,
}

/// Describe a table
pub fn describe(table: &InterfaceTable) -> TableRecord {
    TableRecord {
        interface: table.name(),
        module: table.module(),
        bases: table.bases().to_vec(),
        members: table
            .members()
            .iter()
            .map(|m| MemberRecord {
                index: m.index(),
                name: m.name(),
                declared_by: m.interface(),
                slot: m.slot(),
                kind: m.kind(),
                receiver: m.receiver(),
                params: m.params().to_vec(),
                returns: m.returns(),
            })
            .collect(),
    }
}

/// Synthesize `I` if needed and dump its table into `dir`.
///
/// Returns the written paths.
pub fn dump<I: ?Sized + Interface>(dir: &Path) -> ProxyResult<Vec<PathBuf>> {
    let table = crate::registry::resolve::<I>()?;
    write_table(&table, dir)
}

pub(crate) fn write_table(table: &InterfaceTable, dir: &Path) -> ProxyResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| ProxyError::Dump(format!("{}: {}", dir.display(), e)))?;

    let mut written = Vec::with_capacity(2);

    let json = serde_json::to_string_pretty(&describe(table)).map_err(|e| ProxyError::Dump(e.to_string()))?;
    let stem = file_stem(table);
    let members = dir.join(format!("{}.members.json", stem));
    write(&members, &json)?;
    written.push(members);

    if let Some(expansion) = table.expansion() {
        let source = dir.join(format!("{}.expansion.rs", stem));
        write(&source, expansion)?;
        written.push(source);
    }

    info!(interface = table.name(), dir = %dir.display(), files = written.len(), "dumped proxy table");
    Ok(written)
}

/// Same-named interfaces from different modules get distinct files
pub fn file_stem(table: &InterfaceTable) -> String {
    table.path().replace("::", ".")
}

fn write(path: &Path, contents: &str) -> ProxyResult<()> {
    std::fs::write(path, contents).map_err(|e| ProxyError::Dump(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{InterfaceDescriptor, MemberSpec, TypeKind};

    struct Meter;

    fn table() -> InterfaceTable {
        let desc = InterfaceDescriptor::of_kind::<Meter>("Meter", TypeKind::Interface)
            .member(MemberSpec::getter("reading", "reading").returns::<f64>("f64"))
            .member(MemberSpec::method("calibrate", Receiver::Exclusive).param("offset", "f64"))
            .with_expansion("impl Meter for Proxy {}");
        InterfaceTable::build(desc, &[]).unwrap()
    }

    #[test]
    fn test_describe() {
        let record = describe(&table());
        assert_eq!(record.interface, "Meter");
        assert_eq!(record.members.len(), 2);
        assert_eq!(record.members[1].params[0].name, "offset");
        assert_eq!(record.members[0].kind, MemberKind::Getter { property: "reading" });
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let written = write_table(&table(), &out).unwrap();
        assert_eq!(written.len(), 2);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("Meter.members.json")).unwrap()).unwrap();
        assert_eq!(json["members"][0]["kind"]["role"], "getter");
        assert_eq!(json["members"][1]["params"][0]["type"], "f64");
        assert_eq!(json["members"][1]["receiver"], "exclusive");

        let source = std::fs::read_to_string(out.join("Meter.expansion.rs")).unwrap();
        assert!(source.contains("impl Meter"));
    }

    #[test]
    fn test_module_qualifies_file_names() {
        struct Gauge;
        let desc = InterfaceDescriptor::of_kind::<Gauge>("Meter", TypeKind::Interface)
            .in_module("plant::sensors")
            .member(MemberSpec::getter("reading", "reading").returns::<f64>("f64"));
        let table = InterfaceTable::build(desc, &[]).unwrap();
        assert_eq!(table.path(), "plant::sensors::Meter");
        assert_eq!(file_stem(&table), "plant.sensors.Meter");

        let dir = tempfile::tempdir().unwrap();
        write_table(&self::table(), dir.path()).unwrap();
        let written = write_table(&table, dir.path()).unwrap();
        assert_eq!(written, vec![dir.path().join("plant.sensors.Meter.members.json")]);
        assert!(dir.path().join("Meter.members.json").exists());

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(json["module"], "plant::sensors");
        assert_eq!(describe(&self::table()).module, None);
    }
}
