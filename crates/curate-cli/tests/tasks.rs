//! Task runs against a local store in a temp directory.

use std::fs;
use std::path::Path;

use curate_cli::config::{ExcludeDerivedConfig, GenomicSubsetConfig, ReleaseConfig, SplitConfig, load_config};
use curate_cli::pipeline::RunOptions;
use curate_cli::tasks::{exclude_derived, genomic, release, split};
use curate_cli::types::OutputStatus;
use curate_store::{DataStore, EntityId, LocalStore, read_sidecar, sidecar_path};
use tempfile::{TempDir, tempdir};

const SCOPE_OF_RELEASE: &str = "\
varname,type,Shared for CRC v2.0 Public Release
ca_type,Curated,Yes
dob_ca_dx_days,Derived,Yes
naaccr_race,Tumor Registry,Index cancer only
drugs_ct_yn,Curated,No
";

const DFCI_EXPORT: &str = "\
record_id,redcap_repeat_instrument,redcap_repeat_instance,ca_type,dob_ca_dx_days,naaccr_race,drugs_ct_yn
GENIE-DFCI-1,,,Lung,12,White,Yes
GENIE-DFCI-2,,,Colon,40,Asian,No
GENIE-DFCI-3,cancer_diagnosis,1,Breast,3,,No
";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn release_store() -> (TempDir, LocalStore) {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "reference/scope_of_release/Data Dictionary.csv", SCOPE_OF_RELEASE);
    write(
        root,
        "ledger.csv",
        "genie_id,site,project\nGENIE-DFCI-2,DFCI,CRC\nGENIE-DFCI-1,DFCI,NTRK\nGENIE-VICC-1,VICC,CRC\n",
    );
    write(root, "exports/DFCI.csv", DFCI_EXPORT);
    write(
        root,
        "exports/VICC.csv",
        "record_id,redcap_repeat_instance,ca_type\nGENIE-VICC-1,,Lung\n",
    );
    fs::create_dir_all(root.join("releases/DFCI")).unwrap();
    fs::create_dir_all(root.join("releases/VICC")).unwrap();

    let store = LocalStore::create(root).unwrap();
    store
        .register(EntityId::new("syn22294851"), "reference/scope_of_release", None)
        .unwrap();
    store.register(EntityId::new("syn32299078"), "ledger.csv", None).unwrap();
    store
        .register(EntityId::new("syn49770249"), "exports/DFCI.csv", Some("DFCI"))
        .unwrap();
    store
        .register(EntityId::new("syn49090681"), "exports/VICC.csv", Some("VICC"))
        .unwrap();
    store.register(EntityId::new("syn49688680"), "releases/DFCI", None).unwrap();
    store.register(EntityId::new("syn49091348"), "releases/VICC", None).unwrap();
    (dir, store)
}

fn release_config(root: &Path, sites: &str) -> ReleaseConfig {
    let text = format!(
        r#"
executed = "https://example.org/curation/release"
description = "Release CRC variables"

[catalog]
id = "syn22294851"
sheet = "Data Dictionary"
source = "scope_of_release"
flags = ["shared for crc v2.0 public release"]

[retractions]
ledger = "syn32299078"
project = "CRC"

{sites}
"#
    );
    let path = root.join("release.toml");
    fs::write(&path, text).unwrap();
    load_config(&path).unwrap()
}

const DFCI_SITE: &str = r#"
[[sites]]
name = "DFCI"
input = "syn49770249"
output_folder = "syn49688680"
"#;

const VICC_SITE: &str = r#"
[[sites]]
name = "VICC"
input = "syn49090681"
output_folder = "syn49091348"
"#;

fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn release_filters_variables_and_retracted_records() {
    let (dir, store) = release_store();
    let config = release_config(dir.path(), DFCI_SITE);

    let report = release::run(&store, &config, &RunOptions::default()).unwrap();

    assert_eq!(report.outputs.len(), 1);
    let output = &report.outputs[0];
    assert_eq!(output.name, "DFCI_release.csv");
    assert_eq!(output.rows, 2);
    let OutputStatus::Stored(id) = &output.status else {
        panic!("expected a stored output, got {:?}", output.status);
    };

    let stored = store.fetch(id).unwrap();
    let content = fs::read_to_string(&stored.path).unwrap();
    insta::assert_snapshot!("release_dfci", content.trim_end());

    let sidecar = read_sidecar(&sidecar_path(&stored.path)).unwrap();
    assert_eq!(
        sidecar.provenance.used,
        vec!["syn22294851", "syn49770249", "syn32299078"]
    );
    assert_eq!(
        sidecar.provenance.description.as_deref(),
        Some("Release CRC variables")
    );
    assert!(!report.work_dir.exists());
}

#[test]
fn release_failure_stores_nothing() {
    let (dir, store) = release_store();
    // VICC lacks redcap_repeat_instrument, so its filter fails after DFCI succeeded.
    let config = release_config(dir.path(), &format!("{DFCI_SITE}{VICC_SITE}"));

    let err = release::run(&store, &config, &RunOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("redcap_repeat_instrument"));

    assert!(stored_files(&dir.path().join("releases/DFCI")).is_empty());
    assert!(stored_files(&dir.path().join("releases/VICC")).is_empty());
}

#[test]
fn unknown_output_folder_stores_nothing() {
    let (dir, store) = release_store();
    let bad_site = VICC_SITE.replace("syn49091348", "syn00000000");
    // VICC computes fine but targets an unregistered folder; DFCI comes first.
    write(
        dir.path(),
        "exports/VICC.csv",
        "record_id,redcap_repeat_instrument,redcap_repeat_instance,ca_type\nGENIE-VICC-1,,,Lung\n",
    );
    let config = release_config(dir.path(), &format!("{DFCI_SITE}{bad_site}"));

    let err = release::run(&store, &config, &RunOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("syn00000000"));

    assert!(stored_files(&dir.path().join("releases/DFCI")).is_empty());
    assert!(
        store
            .list_children(&EntityId::new("syn49688680"))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn dry_run_writes_locally_and_stores_nothing() {
    let (dir, store) = release_store();
    let config = release_config(dir.path(), DFCI_SITE);
    let work = tempdir().unwrap();
    let options = RunOptions {
        dry_run: true,
        work_dir: Some(work.path().to_path_buf()),
    };

    let report = release::run(&store, &config, &options).unwrap();

    assert!(report.dry_run);
    assert_eq!(
        report.outputs[0].status,
        OutputStatus::Written(work.path().join("DFCI_release.csv"))
    );
    assert_eq!(stored_files(work.path()), vec!["DFCI_release.csv"]);
    assert!(stored_files(&dir.path().join("releases/DFCI")).is_empty());
}

#[test]
fn exclude_derived_processes_each_export_in_the_folder() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "reference/sor/Data Dictionary.csv", SCOPE_OF_RELEASE);
    write(root, "exports/DFCI.csv", DFCI_EXPORT);
    write(root, "exports/MSK.csv", "record_id,dob_ca_dx_days\nGENIE-MSK-1,5\n");
    write(root, "exports/notes.XLSX", "binary");
    fs::create_dir_all(root.join("exports/archive")).unwrap();
    fs::create_dir_all(root.join("cleaned")).unwrap();

    let store = LocalStore::create(root).unwrap();
    store.register(EntityId::new("syn1"), "reference/sor", None).unwrap();
    store.register(EntityId::new("syn2"), "exports", None).unwrap();
    store.register(EntityId::new("syn3"), "exports/DFCI.csv", None).unwrap();
    store.register(EntityId::new("syn4"), "exports/MSK.csv", None).unwrap();
    store.register(EntityId::new("syn5"), "exports/notes.XLSX", None).unwrap();
    store.register(EntityId::new("syn6"), "exports/archive", None).unwrap();
    store.register(EntityId::new("syn7"), "cleaned", None).unwrap();

    let config_path = root.join("exclude.toml");
    fs::write(
        &config_path,
        r#"
input_folder = "syn2"
output_folder = "syn7"

[dictionary]
id = "syn1"
sheet = "Data Dictionary"
"#,
    )
    .unwrap();
    let config: ExcludeDerivedConfig = load_config(&config_path).unwrap();

    let report = exclude_derived::run(&store, &config, &RunOptions::default()).unwrap();

    let names: Vec<&str> = report.outputs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["DFCI.csv", "MSK.csv"]);

    let children = store.list_children(&EntityId::new("syn7")).unwrap();
    let cleaned = store
        .fetch_table(&children[0].id, None, &curate_ingest::ReadOptions::csv())
        .unwrap();
    assert!(!cleaned.has_column("dob_ca_dx_days"));
    assert!(cleaned.has_column("drugs_ct_yn"));
    assert_eq!(cleaned.row_count(), 3);

    let msk = fs::read_to_string(root.join("cleaned/MSK.csv")).unwrap();
    assert_eq!(msk, "record_id\nGENIE-MSK-1\n");
}

#[test]
fn split_stores_one_file_per_instrument() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "dictionary.csv",
        "Variable / Field Name,Form Name,Field Type\n\
         record_id,curation_initiation_eligibility,text\n\
         birth_year,patient_characteristics,text\n\
         naaccr_race_code_primary,patient_characteristics,checkbox\n\
         ca_type,cancer_diagnosis,dropdown\n",
    );
    write(
        root,
        "labelled.csv",
        "record_id,redcap_repeat_instrument,redcap_repeat_instance,birth_year,naaccr_race_code_primary___1,ca_type\n\
         GENIE-1,,,1950,Checked,\n\
         GENIE-1,cancer_diagnosis,1,,,Lung\n",
    );
    fs::create_dir_all(root.join("instruments")).unwrap();
    let store = LocalStore::create(root).unwrap();
    store.register(EntityId::new("syn26469280"), "dictionary.csv", None).unwrap();
    store.register(EntityId::new("syn26469276"), "labelled.csv", None).unwrap();
    store.register(EntityId::new("syn30041987"), "instruments", None).unwrap();

    let config = SplitConfig {
        executed: "local".to_string(),
        input: EntityId::new("syn26469276"),
        dictionary: EntityId::new("syn26469280"),
        output: Some(EntityId::new("syn30041987")),
    };
    let report = split::run(&store, &config, &RunOptions::default()).unwrap();

    assert_eq!(
        stored_files(&root.join("instruments"))
            .into_iter()
            .filter(|name| name.ends_with(".csv"))
            .collect::<Vec<_>>(),
        vec!["cancer_diagnosis.csv", "patient_characteristics.csv"]
    );
    assert_eq!(report.outputs.len(), 2);
    let diagnosis = fs::read_to_string(root.join("instruments/cancer_diagnosis.csv")).unwrap();
    assert_eq!(diagnosis, "record_id,redcap_repeat_instance,ca_type\nGENIE-1,1,Lung\n");

    let sidecar = read_sidecar(&sidecar_path(&root.join("instruments/cancer_diagnosis.csv"))).unwrap();
    assert_eq!(sidecar.provenance.description.as_deref(), Some(split::DESCRIPTION));
    assert_eq!(sidecar.provenance.used, vec!["syn26469276", "syn26469280"]);
}

#[test]
fn split_without_output_requires_dry_run() {
    let dir = tempdir().unwrap();
    let store = LocalStore::create(dir.path()).unwrap();
    let config = SplitConfig {
        executed: "local".to_string(),
        input: EntityId::new("syn1"),
        dictionary: EntityId::new("syn2"),
        output: None,
    };
    let err = split::run(&store, &config, &RunOptions::default()).unwrap_err();
    assert!(err.to_string().contains("--output"));
}

#[test]
fn genomic_subset_keeps_samples_of_listed_patients() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "patients.csv", "PATIENT_ID\nP1\nP3\n");
    write(
        root,
        "data_clinical_sample.txt",
        "#Patient Identifier\tSample Identifier\tOncotree\n\
         #STRING\tSTRING\tSTRING\n\
         PATIENT_ID\tSAMPLE_ID\tONCOTREE_CODE\n\
         P1\tS1a\tLUAD\n\
         P1\tS1b\tLUAD\n\
         P2\tS2\tBRCA\n\
         P3\tS3\tCOAD\n",
    );
    write(
        root,
        "data_mutations_extended.txt",
        "Hugo_Symbol\tTumor_Sample_Barcode\tHGVSp_Short\n\
         KRAS\tS1a\tp.G12C\n\
         TP53\tS2\tp.R175H\n\
         EGFR\tS3\tp.L858R\n",
    );
    write(
        root,
        "data_CNA.txt",
        "Hugo_Symbol\tS1a\tS2\tS3\n\
         ERBB2\t2\t0\t-1\n",
    );
    fs::create_dir_all(root.join("subset")).unwrap();
    let store = LocalStore::create(root).unwrap();
    store.register(EntityId::new("syn33113130"), "patients.csv", None).unwrap();
    store
        .register(EntityId::new("syn32299605"), "data_clinical_sample.txt", None)
        .unwrap();
    store
        .register(EntityId::new("syn32299617"), "data_mutations_extended.txt", None)
        .unwrap();
    store.register(EntityId::new("syn32299613"), "data_CNA.txt", None).unwrap();
    store.register(EntityId::new("syn33113020"), "subset", None).unwrap();

    let config_path = root.join("genomic.toml");
    fs::write(
        &config_path,
        r#"
patients = "syn33113130"
samples = "syn32299605"
mutations = "syn32299617"
cna = "syn32299613"
output_folder = "syn33113020"
"#,
    )
    .unwrap();
    let config: GenomicSubsetConfig = load_config(&config_path).unwrap();

    let report = genomic::run(&store, &config, &RunOptions::default()).unwrap();
    assert_eq!(report.outputs.len(), 2);

    let maf = fs::read_to_string(root.join("subset/subset_maf.tsv")).unwrap();
    assert_eq!(
        maf,
        "Hugo_Symbol\tTumor_Sample_Barcode\tHGVSp_Short\nKRAS\tS1a\tp.G12C\nEGFR\tS3\tp.L858R\n"
    );
    let cna = fs::read_to_string(root.join("subset/subset_cna.tsv")).unwrap();
    assert_eq!(cna, "Hugo_Symbol\tS1a\tS3\nERBB2\t2\t-1\n");

    let sidecar = read_sidecar(&sidecar_path(&root.join("subset/subset_cna.tsv"))).unwrap();
    assert_eq!(sidecar.provenance.used, vec!["syn33113130", "syn32299613"]);
}
