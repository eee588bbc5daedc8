//! Deferred large object loading through a retained cursor.

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::MemoryRow;
use sql_record_rs::protocol::constants::*;
use sql_record_rs::{
    BlobRef, ClobRef, CompileOptions, DelimiterSet, Error, FieldValue, GeneratedRecordType,
    MemoryCatalog, RecordCompiler, StagingLobLoader,
};

async fn documents() -> GeneratedRecordType {
    let mut catalog = MemoryCatalog::new().with_table(
        "documents",
        [
            ("id", SQL_TYPE_INTEGER),
            ("body", SQL_TYPE_CLOB),
            ("scan", SQL_TYPE_BLOB),
        ],
    );
    let options = CompileOptions::table("documents")
        .with_output_delimiters(DelimiterSet::default().with_field_separator('\t'));
    RecordCompiler::new(options)
        .compile(&mut catalog)
        .await
        .unwrap()
}

fn staging_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sql_record_rs_{}_{}", name, std::process::id()))
}

#[tokio::test]
async fn test_lob_columns_null_until_loaded() {
    let record_type = documents().await;
    let row = Arc::new(
        MemoryRow::new(vec![FieldValue::Integer(1), FieldValue::Null, FieldValue::Null])
            .with_clob(2, "short text")
            .with_blob(3, vec![1, 2, 3]),
    );

    let mut record = record_type.read_from(row).unwrap();
    assert_eq!(record.get(0), Some(&FieldValue::Integer(1)));
    assert_eq!(record.get(1), Some(&FieldValue::Null));
    assert_eq!(record.get(2), Some(&FieldValue::Null));
    assert!(record.cursor().is_some());

    let mut loader = StagingLobLoader::new(staging_dir("inline"));
    record_type
        .load_deferred(&mut record, &mut loader)
        .await
        .unwrap();

    assert_eq!(
        record.get(1),
        Some(&FieldValue::Clob(ClobRef::Inline("short text".into())))
    );
    assert_eq!(
        record.get(2),
        Some(&FieldValue::Blob(BlobRef::Inline(vec![1, 2, 3])))
    );
    assert_eq!(
        record_type.format_default(&record).unwrap(),
        "1\tshort text\tAQID\n"
    );
}

#[tokio::test]
async fn test_large_objects_staged_to_files() {
    let record_type = documents().await;
    let body = "x".repeat(64);
    let row = Arc::new(
        MemoryRow::new(vec![FieldValue::Integer(2), FieldValue::Null, FieldValue::Null])
            .with_clob(2, &body)
            .with_blob(3, vec![0xAB; 8]),
    );

    let dir = staging_dir("staged");
    let mut loader = StagingLobLoader::new(&dir).with_inline_limit(16);
    let mut record = record_type.read_from(row).unwrap();
    record_type
        .load_deferred(&mut record, &mut loader)
        .await
        .unwrap();

    let clob = match record.get(1) {
        Some(FieldValue::Clob(ClobRef::External(lob))) => lob.clone(),
        other => panic!("Expected external clob, got {:?}", other),
    };
    assert_eq!(clob.offset, 0);
    assert_eq!(clob.length, 64);
    assert!(clob.file.ends_with("large_obj_0.clob"));
    let staged = tokio::fs::read_to_string(&clob.file).await.unwrap();
    assert_eq!(staged, body);

    // Eight bytes fit under the limit.
    match record.get(2) {
        Some(FieldValue::Blob(BlobRef::Inline(bytes))) => assert_eq!(bytes.len(), 8),
        other => panic!("Expected inline blob, got {:?}", other),
    }

    let line = record_type.format_default(&record).unwrap();
    assert_eq!(line, format!("2\t{}\tq6urq6urq6s=\n", clob));
    assert!(line.contains("externalLob(lf,"));

    let parsed = record_type
        .parse(&line, record_type.output_delimiters())
        .unwrap();
    assert_eq!(parsed.get(1), record.get(1));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_staged_files_are_numbered_per_loader() {
    let record_type = documents().await;
    let dir = staging_dir("numbered");
    let mut loader = StagingLobLoader::new(&dir).with_inline_limit(2);

    for expected in ["large_obj_0.clob", "large_obj_2.clob"] {
        let row = Arc::new(
            MemoryRow::new(vec![FieldValue::Integer(3), FieldValue::Null, FieldValue::Null])
                .with_clob(2, "abcdef")
                .with_blob(3, vec![9; 4]),
        );
        let mut record = record_type.read_from(row).unwrap();
        record_type
            .load_deferred(&mut record, &mut loader)
            .await
            .unwrap();
        match record.get(1) {
            Some(FieldValue::Clob(ClobRef::External(lob))) => {
                assert!(lob.file.ends_with(expected), "{}", lob.file)
            }
            other => panic!("Expected external clob, got {:?}", other),
        }
        assert!(matches!(
            record.get(2),
            Some(FieldValue::Blob(BlobRef::External(_)))
        ));
    }

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_null_lob_stays_null() {
    let record_type = documents().await;
    let row = Arc::new(MemoryRow::new(vec![
        FieldValue::Integer(4),
        FieldValue::Null,
        FieldValue::Null,
    ]));
    let mut record = record_type.read_from(row).unwrap();
    let mut loader = StagingLobLoader::new(staging_dir("null"));
    record_type
        .load_deferred(&mut record, &mut loader)
        .await
        .unwrap();
    assert_eq!(record.get(1), Some(&FieldValue::Null));
    assert_eq!(record.get(2), Some(&FieldValue::Null));
}

#[tokio::test]
async fn test_load_without_cursor_fails() {
    let record_type = documents().await;
    let mut record = record_type.new_record();
    let mut loader = StagingLobLoader::new(staging_dir("cursorless"));
    let err = record_type
        .load_deferred(&mut record, &mut loader)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingCursor));
}

#[tokio::test]
async fn test_external_lob_cannot_be_written() {
    let record_type = documents().await;
    let dir = staging_dir("unwritable");
    let row = Arc::new(
        MemoryRow::new(vec![FieldValue::Integer(5), FieldValue::Null, FieldValue::Null])
            .with_clob(2, "too long for the limit"),
    );
    let mut loader = StagingLobLoader::new(&dir).with_inline_limit(4);
    let mut record = record_type.read_from(row).unwrap();
    record_type
        .load_deferred(&mut record, &mut loader)
        .await
        .unwrap();

    let mut sink = common::RecordingSink::default();
    let err = record_type.write_to(&record, &mut sink, 0).unwrap_err();
    assert!(matches!(err, Error::ExternalLobWrite { ref column } if column == "body"));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_load_rejects_record_of_another_type() {
    let record_type = documents().await;
    let mut catalog = MemoryCatalog::new().with_table("ids", [("id", SQL_TYPE_INTEGER)]);
    let ids = RecordCompiler::new(CompileOptions::table("ids"))
        .compile(&mut catalog)
        .await
        .unwrap();
    let mut loader = StagingLobLoader::new(staging_dir("foreign"));

    let row = Arc::new(MemoryRow::new(vec![FieldValue::Integer(6)]));
    let mut narrow = ids.read_from(row).unwrap();
    let err = record_type
        .load_deferred(&mut narrow, &mut loader)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FieldCount { expected: 3, actual: 1 }));

    let mut catalog = MemoryCatalog::new().with_table(
        "notes",
        [
            ("id", SQL_TYPE_INTEGER),
            ("body", SQL_TYPE_VARCHAR),
            ("scan", SQL_TYPE_BLOB),
        ],
    );
    let notes = RecordCompiler::new(CompileOptions::table("notes"))
        .compile(&mut catalog)
        .await
        .unwrap();
    let row = Arc::new(
        MemoryRow::new(vec![
            FieldValue::Integer(7),
            FieldValue::Text("plain".into()),
            FieldValue::Null,
        ])
        .with_clob(2, "not a clob column here"),
    );
    let mut same_width = notes.read_from(row).unwrap();
    let err = record_type
        .load_deferred(&mut same_width, &mut loader)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol { .. }));
    assert_eq!(same_width.get(1), Some(&FieldValue::Text("plain".into())));
}
