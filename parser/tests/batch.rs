use std::fs;
use std::path::{Path, PathBuf};

use cardprofile_core::ReportKind;
use cardprofile_parser::{
    ConvertOptions, OutputFormat, collect_input_files, process_files, process_folder,
};
use tempfile::TempDir;

const TPM_LOG: &str = "Manufacturer;INTC\n\nTPM2_Hash\n\nHash algorithm:;0x000B\n";
const ALGSUPPORT_LOG: &str = "Card name;X\nJavaCard support version;3.0.4\n\nCPLC\nICType;5167\n";

fn write(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// process_files
// ---------------------------------------------------------------------------

#[test]
fn process_files_writes_json_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "INTC_tpm.csv", TPM_LOG);

    let outcomes = process_files(&[input.clone()], &ConvertOptions::default());

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert!(outcome.success, "unexpected failure: {:?}", outcome.error);
    assert_eq!(outcome.kind, ReportKind::Tpm);
    assert_eq!(outcome.sections, 2);

    let output = dir.path().join("INTC_tpm.json");
    assert_eq!(outcome.output.as_deref(), Some(output.as_path()));
    let json = read_json(&output);
    assert_eq!(json["_type"], "tpm");
    assert_eq!(json["TPM2_Hash"][0]["Hash algorithm"], "0x000B");
}

#[test]
fn process_files_continues_after_missing_input() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone_tpm.csv");
    let present = write(dir.path(), "card_tpm.csv", TPM_LOG);

    let outcomes = process_files(&[missing.clone(), present], &ConvertOptions::default());

    assert_eq!(outcomes.len(), 2);
    assert!(!outcomes[0].success);
    assert_eq!(outcomes[0].input, missing);
    assert!(outcomes[0].output.is_none());
    assert!(outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .starts_with("failed to read"));
    assert!(outcomes[1].success);
    assert!(dir.path().join("card_tpm.json").exists());
}

#[test]
fn process_files_uses_yaml_extension() {
    let dir = TempDir::new().unwrap();
    let input = write(dir.path(), "card_tpm.csv", TPM_LOG);
    let options = ConvertOptions {
        format: OutputFormat::Yaml,
        ..Default::default()
    };

    let outcomes = process_files(&[input], &options);

    assert!(outcomes[0].success);
    let yaml = fs::read_to_string(dir.path().join("card_tpm.yaml")).unwrap();
    assert!(yaml.starts_with("_type: tpm"));
}

#[test]
fn process_files_keeps_input_order_in_parallel() {
    let dir = TempDir::new().unwrap();
    let inputs: Vec<PathBuf> = (0..8)
        .map(|i| write(dir.path(), &format!("card{i}_tpm.csv"), TPM_LOG))
        .collect();
    let options = ConvertOptions {
        jobs: Some(4),
        ..Default::default()
    };

    let outcomes = process_files(&inputs, &options);

    let order: Vec<&PathBuf> = outcomes.iter().map(|outcome| &outcome.input).collect();
    assert_eq!(order, inputs.iter().collect::<Vec<_>>());
    assert!(outcomes.iter().all(|outcome| outcome.success));
}

// ---------------------------------------------------------------------------
// process_folder
// ---------------------------------------------------------------------------

#[test]
fn process_folder_mirrors_nested_layout() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write(source.path(), "vendor/a/card_ALGSUPPORT.csv", ALGSUPPORT_LOG);
    write(source.path(), "vendor/b/INTC_tpm.CSV", TPM_LOG);
    write(source.path(), "vendor/notes.txt", "not a log");

    let outcomes = process_folder(source.path(), Some(output.path()), &ConvertOptions::default());

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|outcome| outcome.success));

    let algsupport = read_json(&output.path().join("vendor/a/card_ALGSUPPORT.json"));
    assert_eq!(algsupport["_type"], "javacard-algsupport");
    assert_eq!(algsupport["CPLC"][0]["name"], "ICType");

    let tpm = read_json(&output.path().join("vendor/b/INTC_tpm.json"));
    assert_eq!(tpm["_type"], "tpm");
    assert!(!output.path().join("vendor/notes.json").exists());
}

#[test]
fn process_folder_applies_exclusions_and_counts_them() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write(source.path(), "card_ALGSUPPORT.csv", ALGSUPPORT_LOG);
    let options = ConvertOptions {
        exclusions: ["Card name".to_string()].into(),
        ..Default::default()
    };

    let outcomes = process_folder(source.path(), Some(output.path()), &options);

    assert_eq!(outcomes[0].excluded, 1);
    let json = read_json(&output.path().join("card_ALGSUPPORT.json"));
    let basic = json["Basic information"].as_array().unwrap();
    assert_eq!(basic.len(), 1);
    assert_eq!(basic[0]["name"], "JavaCard support version");
}

#[test]
fn process_folder_with_missing_source_yields_nothing() {
    let dir = TempDir::new().unwrap();
    let outcomes = process_folder(
        &dir.path().join("missing"),
        Some(dir.path()),
        &ConvertOptions::default(),
    );
    assert!(outcomes.is_empty());
}

#[test]
fn collect_input_files_is_sorted_and_case_insensitive() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "b/second.csv", "");
    write(dir.path(), "a/first.CSV", "");
    write(dir.path(), "a/skip.json", "");

    let files = collect_input_files(dir.path());

    assert_eq!(
        files,
        vec![dir.path().join("a/first.CSV"), dir.path().join("b/second.csv")]
    );
}

#[cfg(unix)]
#[test]
fn collect_input_files_survives_symlink_loop() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "card.csv", "");
    std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

    let files = collect_input_files(dir.path());

    assert_eq!(files, vec![dir.path().join("card.csv")]);
}
