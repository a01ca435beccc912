//! Integration tests for the package store
//!
//! Exercises the on-disk schema and write-through behaviour.

mod common;

use proptest::prelude::*;
use tempfile::TempDir;

use alarmpkg::core::record::{task_name, TaskKind};
use alarmpkg::core::store::PackageStore;
use alarmpkg::error::StoreError;
use common::{new_package, TestProject, SAMPLE_DB};

#[test]
fn test_opens_sample_database() {
    let project = TestProject::with_sample_db();
    let store = project.store();

    assert_eq!(store.names(), ["example-package", "linux", "zlib"]);
    let linux = store.get("linux").unwrap();
    assert_eq!(linux.version, "6.1");
    assert_eq!(linux.major_version(), "6");
    assert_eq!(linux.build.build_task, "build_pkg_linux");
    assert_eq!(
        linux.urls.source_url_with(&[linux.major_version(), &linux.version]),
        "https://cdn.kernel.org/pub/linux/kernel/v6.x/linux-6.1.tar.xz"
    );
}

#[test]
fn test_write_preserves_schema_keys() {
    let project = TestProject::with_sample_db();
    let mut store = project.store();

    store.set_version("zlib", "1.3.1").unwrap();

    let raw: serde_json::Value = serde_json::from_str(&project.read_file("db/db.json")).unwrap();
    let zlib = &raw["package_info"]["zlib"];
    assert_eq!(zlib["version"], "1.3.1");
    assert_eq!(zlib["urls"]["type"], "https");
    assert_eq!(zlib["paths"]["repo"], "/packages/core/os/aarch64/zlib");
    assert_eq!(zlib["buildInfo"]["markedForBuild"], true);
    assert_eq!(zlib["buildInfo"]["prepareFunctionName"], "prepare_pkg_zlib");
    assert_eq!(raw["packages"][0], "example-package");
}

#[test]
fn test_setter_touches_only_one_field() {
    let project = TestProject::with_sample_db();
    let mut store = project.store();
    let before = store.list();

    store.set_marked_for_build("linux", true).unwrap();

    let after = PackageStore::open(&project.db_path()).unwrap().list();
    for (old, new) in before.iter().zip(&after) {
        if old.name == "linux" {
            let mut expected = old.clone();
            expected.build.marked_for_build = true;
            assert_eq!(new, &expected);
        } else {
            assert_eq!(new, old);
        }
    }
}

#[test]
fn test_no_temporary_file_left_behind() {
    let project = TestProject::with_sample_db();
    let mut store = project.store();

    store.set_version("linux", "6.2").unwrap();

    assert!(!project.file_exists("db/db.json.tmp"));
}

#[test]
fn test_unlisted_entry_is_load_failure() {
    let project = TestProject::new();
    project.create_file(
        "db/db.json",
        &SAMPLE_DB.replace(r#"["example-package", "linux", "zlib"]"#, r#"["linux", "zlib"]"#),
    );

    let result = PackageStore::open(&project.db_path());
    assert!(matches!(result, Err(StoreError::Load { .. })));
}

#[test]
fn test_remove_keeps_remaining_order() {
    let temp = TempDir::new().unwrap();
    let mut store = PackageStore::create(&temp.path().join("db.json")).unwrap();
    for name in ["a", "b", "c", "d"] {
        store.add(new_package(name, "1")).unwrap();
    }

    store.remove("b").unwrap();

    let reloaded = PackageStore::open(store.path()).unwrap();
    assert_eq!(reloaded.names(), ["a", "c", "d"]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Task names are deterministic and carry their table's prefix
    #[test]
    fn prop_task_names_deterministic(name in "[A-Za-z][A-Za-z0-9._+-]{0,20}") {
        let build = task_name(TaskKind::Build, &name);
        prop_assert_eq!(&build, &task_name(TaskKind::Build, &name));
        prop_assert!(build.starts_with("build_pkg_"));
        prop_assert!(task_name(TaskKind::Prepare, &name).starts_with("prepare_pkg_"));
        prop_assert!(build.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    /// Every added package can be read back and removed
    #[test]
    fn prop_add_remove(names in proptest::collection::btree_set("[a-z][a-z0-9]{0,8}", 1..6)) {
        let temp = TempDir::new().unwrap();
        let mut store = PackageStore::create(&temp.path().join("db.json")).unwrap();

        for name in &names {
            store.add(new_package(name, "1.0")).unwrap();
        }
        prop_assert_eq!(store.len(), names.len());

        for name in &names {
            prop_assert_eq!(&store.remove(name).unwrap().name, name);
        }
        prop_assert!(PackageStore::open(store.path()).unwrap().is_empty());
    }
}
