//! `LocalStore` behaviour through the `DataStore` trait.

use std::fs;

use curate_ingest::ReadOptions;
use curate_model::{ProvenanceRecord, RetractionSet};
use curate_store::{
    DataStore, EntityId, LocalStore, StoreError, StoreRequest, read_sidecar, sidecar_path,
};
use tempfile::{TempDir, tempdir};

fn seeded_store() -> (TempDir, LocalStore) {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("reference/scope_of_release")).unwrap();
    fs::write(
        root.join("reference/scope_of_release/Data Dictionary.csv"),
        "VARNAME,TYPE,Shared for CRC v2.0 Public Release\nca_type,Curated,Yes\n",
    )
    .unwrap();
    fs::write(
        root.join("reference/scope_of_release/Sheet1.csv"),
        "other\nvalue\n",
    )
    .unwrap();
    fs::write(
        root.join("ledger.csv"),
        "genie_id,site,project\nGENIE-DFCI-1,DFCI,NTRK\nGENIE-DFCI-2,DFCI,CRC\nGENIE-MSK-1,MSK,NTRK\n,DFCI,NTRK\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("outputs")).unwrap();
    fs::write(root.join("outputs/notes.xlsx"), "binary").unwrap();

    let store = LocalStore::create(root).unwrap();
    store
        .register(EntityId::new("syn22294851"), "reference/scope_of_release", Some("Scope of release"))
        .unwrap();
    store.register(EntityId::new("syn32299078"), "ledger.csv", None).unwrap();
    store.register(EntityId::new("syn9"), "outputs", None).unwrap();
    store
        .register(EntityId::new("syn10"), "outputs/notes.xlsx", None)
        .unwrap();
    (dir, store)
}

#[test]
fn workbook_sheets_are_selected_by_name() {
    let (_dir, store) = seeded_store();
    let id = EntityId::new("syn22294851");

    let sheet = store
        .fetch_table(&id, Some("data dictionary"), &ReadOptions::csv())
        .unwrap();
    assert_eq!(sheet.columns[0], "VARNAME");

    let first = store.fetch_table(&id, None, &ReadOptions::csv()).unwrap();
    assert_eq!(first.columns, sheet.columns);

    let err = store
        .fetch_table(&id, Some("Sheet9"), &ReadOptions::csv())
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::SheetNotFound { ref available, .. } if available.len() == 2
    ));
}

#[test]
fn native_workbooks_are_rejected() {
    let (_dir, store) = seeded_store();
    let err = store
        .fetch_table(&EntityId::new("syn10"), None, &ReadOptions::csv())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotATable { .. }));
}

#[test]
fn ledger_query_scopes_by_project() {
    let (_dir, store) = seeded_store();
    let rows = store
        .query_ledger(&EntityId::new("syn32299078"), "NTRK")
        .unwrap();
    assert_eq!(rows.len(), 2);

    let excluded = RetractionSet::scoped(&rows, "DFCI", "NTRK");
    assert_eq!(excluded.len(), 1);
    assert!(excluded.contains("GENIE-DFCI-1"));
    assert!(RetractionSet::scoped(&rows, "VICC", "NTRK").is_empty());
}

#[test]
fn stored_files_are_registered_with_provenance() {
    let (dir, store) = seeded_store();
    let local = dir.path().join("scratch.csv");
    fs::write(&local, "record_id\nR1\n").unwrap();

    let provenance = ProvenanceRecord::new("https://github.com/example/curation/blob/abc123/release.py")
        .with_description("Release variables")
        .used("syn22294851")
        .used("syn32299078");
    let request = StoreRequest {
        local_path: local.clone(),
        name: "DFCI_release.csv".to_string(),
        parent: EntityId::new("syn9"),
        provenance: provenance.clone(),
    };
    let stored = store.store(&request).unwrap();

    assert_eq!(fs::read_to_string(&stored.path).unwrap(), "record_id\nR1\n");
    let sidecar = read_sidecar(&sidecar_path(&stored.path)).unwrap();
    assert_eq!(sidecar.entity_id, stored.id);
    assert_eq!(sidecar.sha256, stored.sha256);
    assert_eq!(sidecar.provenance, provenance);

    let children = store.list_children(&EntityId::new("syn9")).unwrap();
    let names: Vec<_> = children.iter().map(|child| child.name.as_str()).collect();
    assert_eq!(names, vec!["DFCI_release.csv", "notes.xlsx"]);

    // A second run replaces the same entity.
    fs::write(&local, "record_id\nR2\n").unwrap();
    let again = store.store(&request).unwrap();
    assert_eq!(again.id, stored.id);
    assert_ne!(again.sha256, stored.sha256);
    assert_eq!(store.list_children(&EntityId::new("syn9")).unwrap().len(), 2);

    let reopened = LocalStore::open(dir.path()).unwrap();
    let table = reopened
        .fetch_table(&stored.id, None, &ReadOptions::csv())
        .unwrap();
    assert_eq!(table.row_count(), 1);
}

#[test]
fn store_requires_a_folder_parent() {
    let (dir, store) = seeded_store();
    let local = dir.path().join("scratch.csv");
    fs::write(&local, "a\n1\n").unwrap();
    let request = StoreRequest {
        local_path: local,
        name: "x.csv".to_string(),
        parent: EntityId::new("syn32299078"),
        provenance: ProvenanceRecord::new("local"),
    };
    assert!(matches!(
        store.store(&request),
        Err(StoreError::NotAFolder { .. })
    ));
}

#[test]
fn destination_check_stores_nothing() {
    let (dir, store) = seeded_store();
    store
        .check_destination(&EntityId::new("syn9"), "DFCI_release.csv")
        .unwrap();
    assert!(matches!(
        store.check_destination(&EntityId::new("syn404"), "x.csv"),
        Err(StoreError::UnknownEntity { .. })
    ));
    assert!(matches!(
        store.check_destination(&EntityId::new("syn32299078"), "x.csv"),
        Err(StoreError::NotAFolder { .. })
    ));
    assert!(matches!(
        store.check_destination(&EntityId::new("syn9"), "../x.csv"),
        Err(StoreError::NotATable { .. })
    ));
    assert!(!dir.path().join("outputs/DFCI_release.csv").exists());
    assert_eq!(store.list_children(&EntityId::new("syn9")).unwrap().len(), 1);
}
