//! Dataset artifact lifecycle: export to a file, inspect, and import back
//! through the conflict and merge rules.

use signsh::store::{
    DatasetBackend, GestureDataset, MemoryBackend, MergeDecision, export_dataset,
    export_filename, import_dataset,
};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;

fn seeded_backend() -> MemoryBackend {
    let mut dataset = GestureDataset::new();
    dataset.insert_example("hello", vec![0.1, 0.2]);
    dataset.insert_example("hello", vec![0.15, 0.25]);
    dataset.insert_example("bye", vec![0.9, 0.8]);
    MemoryBackend::with_dataset(dataset)
}

#[tokio::test]
async fn test_export_file_imports_back_identically() {
    let backend = seeded_backend();
    let stored = backend.fetch().await.unwrap();

    let export = export_dataset(&stored, SystemTime::UNIX_EPOCH + Duration::from_secs(86_400));
    assert_eq!(export.metadata.total_gestures, 2);
    assert_eq!(export.metadata.total_examples, 3);

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", export.to_json_pretty().unwrap()).unwrap();
    file.flush().unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    let imported = import_dataset(&text).unwrap();
    assert_eq!(imported, stored);
}

#[test]
fn test_bare_mapping_imports_without_wrapper() {
    // Hand-written files may skip the export envelope entirely.
    let text = r#"{"wave": [[0.1, 0.2], [0.3, 0.4]]}"#;
    let imported = import_dataset(text).unwrap();
    assert_eq!(imported.example_count("wave"), Some(2));
}

#[test]
fn test_export_filename_is_dated() {
    let at = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
    assert_eq!(export_filename(at), "gesture-dataset-1970-01-02.json");
}

#[tokio::test]
async fn test_conflicting_import_is_rejected_without_decision() {
    let backend = seeded_backend();

    let mut incoming = GestureDataset::new();
    incoming.insert_example("hello", vec![0.5, 0.5]);
    incoming.insert_example("thanks", vec![0.3, 0.3]);

    let report = backend.check_conflicts(&incoming).await.unwrap();
    assert!(report.has_conflicts);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].label, "hello");
    assert_eq!(report.conflicts[0].existing_count, 2);
    assert_eq!(report.conflicts[0].incoming_count, 1);
    assert_eq!(report.new_labels, ["thanks"]);

    // No decision for "hello": the stored examples win.
    let outcome = backend.merge(&incoming, &BTreeMap::new()).await.unwrap();
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.replaced, 0);
    assert_eq!(outcome.rejected, 1);

    let stored = backend.fetch().await.unwrap();
    assert_eq!(stored.example_count("hello"), Some(2));
    assert_eq!(stored.example_count("thanks"), Some(1));
}

#[tokio::test]
async fn test_replace_decision_overwrites_conflicting_label() {
    let backend = seeded_backend();

    let mut incoming = GestureDataset::new();
    incoming.insert_example("hello", vec![0.5, 0.5]);

    let mut decisions = BTreeMap::new();
    decisions.insert("hello".to_string(), MergeDecision::Replace);
    let outcome = backend.merge(&incoming, &decisions).await.unwrap();
    assert_eq!(outcome.added, 0);
    assert_eq!(outcome.replaced, 1);
    assert_eq!(outcome.rejected, 0);

    let stored = backend.fetch().await.unwrap();
    assert_eq!(stored.example_count("hello"), Some(1));
    // Untouched labels survive a merge.
    assert_eq!(stored.example_count("bye"), Some(1));
}

#[tokio::test]
async fn test_exported_file_merges_into_empty_backend() {
    let source = seeded_backend();
    let export = export_dataset(&source.fetch().await.unwrap(), SystemTime::now());

    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", export.to_json_pretty().unwrap()).unwrap();
    file.flush().unwrap();

    let target = MemoryBackend::new();
    let text = std::fs::read_to_string(file.path()).unwrap();
    let candidate = import_dataset(&text).unwrap();

    let report = target.check_conflicts(&candidate).await.unwrap();
    assert!(!report.has_conflicts);
    assert_eq!(report.new_labels, ["bye", "hello"]);

    let outcome = target.merge(&candidate, &BTreeMap::new()).await.unwrap();
    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.rejected, 0);

    let stats = target.stats().await.unwrap();
    assert_eq!(stats.total_gestures, 2);
    assert_eq!(stats.total_examples, 3);
}

#[test]
fn test_import_rejects_malformed_document() {
    assert!(import_dataset("[1, 2, 3]").is_err());
    assert!(import_dataset("{\"wave\": \"nope\"}").is_err());
    assert!(import_dataset("not json at all").is_err());
}
