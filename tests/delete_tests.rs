//! Integration tests for range deletes: tombstoning of unflushed rows,
//! copy-on-write rewrites of committed dataobjects, and the chronological
//! ordering the rewrites must preserve.

use minilake::{Error, LakeClient, MemoryObjectStore, ObjectStore, QueryRange, Row, Value};

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn row(name: &str, n: i64) -> Row {
    vec![Value::String(name.into()), Value::Integer(n)]
}

fn int_range(start: i64, end: i64) -> QueryRange {
    QueryRange {
        start: Value::Integer(start),
        end: Value::Integer(end),
    }
}

fn scan_all<S: ObjectStore>(client: &LakeClient<S>, table: &str) -> Vec<Row> {
    client
        .scan(table)
        .unwrap()
        .collect::<minilake::Result<Vec<_>>>()
        .unwrap()
}

fn first_column(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|r| match &r[0] {
            Value::String(s) => s.clone(),
            other => panic!("expected string, got {:?}", other),
        })
        .collect()
}

#[test]
fn test_delete_tombstones_unflushed_rows() {
    let mut client = LakeClient::new(MemoryObjectStore::new());

    client.new_tx().unwrap();
    client.create_table("x", columns(&["a", "b"])).unwrap();
    client.write_row("x", row("joey", 1)).unwrap();
    client.write_row("x", row("yue", 2)).unwrap();
    client.write_row("x", row("alice", 3)).unwrap();

    client.delete_rows("x", "b", int_range(2, 2)).unwrap();

    // Reverse-chronological, with yue tombstoned away.
    let rows = scan_all(&client, "x");
    assert_eq!(first_column(&rows), vec!["alice", "joey"]);
}

#[test]
fn test_delete_committed_rows_is_copy_on_write() {
    let store = MemoryObjectStore::new();
    let mut client = LakeClient::new(store.clone());

    client.new_tx().unwrap();
    client.create_table("x", columns(&["a", "b"])).unwrap();
    client.write_row("x", row("joey", 1)).unwrap();
    client.write_row("x", row("yue", 2)).unwrap();
    client.write_row("x", row("alice", 3)).unwrap();
    client.delete_rows("x", "b", int_range(2, 2)).unwrap();
    client.commit_tx().unwrap();

    client.new_tx().unwrap();
    client.delete_rows("x", "b", int_range(2, 4)).unwrap();
    let rows = scan_all(&client, "x");
    assert_eq!(first_column(&rows), vec!["joey"]);
    client.commit_tx().unwrap();

    // The rewrite survives replay.
    client.new_tx().unwrap();
    let rows = scan_all(&client, "x");
    assert_eq!(first_column(&rows), vec!["joey"]);
    client.commit_tx().unwrap();

    // The second log blob carries exactly one AddDataobject (the rewrite,
    // pinned to the original object's transaction id) and one
    // DeleteDataobject (stamped with the deleting transaction's id).
    let bytes = store.read("_log_00000000000000000001").unwrap();
    let record: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let actions = record["actions"]["x"].as_array().unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0]["AddDataobject"]["tx_id"], 0);
    assert_eq!(actions[1]["DeleteDataobject"]["tx_id"], 1);
}

#[test]
fn test_delete_matching_nothing_is_a_complete_no_op() {
    let store = MemoryObjectStore::new();
    let mut client = LakeClient::new(store.clone());

    client.new_tx().unwrap();
    client.create_table("x", columns(&["a", "b"])).unwrap();
    client.write_row("x", row("joey", 1)).unwrap();
    client.commit_tx().unwrap();

    let blobs_before = store.list_prefix_ordered("").unwrap();

    client.new_tx().unwrap();
    client.delete_rows("x", "b", int_range(100, 200)).unwrap();
    assert_eq!(first_column(&scan_all(&client, "x")), vec!["joey"]);
    // No delete actions were authored, so the commit is read-only.
    client.commit_tx().unwrap();

    assert_eq!(store.list_prefix_ordered("").unwrap(), blobs_before);
}

#[test]
fn test_rewrite_keeps_the_original_chronological_slot() {
    let store = MemoryObjectStore::new();
    let mut client = LakeClient::new(store);

    // Two committed dataobjects in separate transactions.
    client.new_tx().unwrap();
    client.create_table("x", columns(&["a", "b"])).unwrap();
    client.write_row("x", row("one", 1)).unwrap();
    client.write_row("x", row("two", 2)).unwrap();
    client.commit_tx().unwrap();

    client.new_tx().unwrap();
    client.write_row("x", row("three", 3)).unwrap();
    client.write_row("x", row("four", 4)).unwrap();
    client.commit_tx().unwrap();

    // Rewrite the older object by deleting one of its rows.
    client.new_tx().unwrap();
    client.delete_rows("x", "b", int_range(1, 1)).unwrap();
    client.commit_tx().unwrap();

    // The surviving row of the rewritten object still reads as older than
    // everything in the second object.
    client.new_tx().unwrap();
    let rows = scan_all(&client, "x");
    assert_eq!(first_column(&rows), vec!["four", "three", "two"]);
    client.commit_tx().unwrap();
}

#[test]
fn test_delete_entire_dataobject_writes_no_replacement() {
    let store = MemoryObjectStore::new();
    let mut client = LakeClient::new(store.clone());

    client.new_tx().unwrap();
    client.create_table("x", columns(&["a", "b"])).unwrap();
    client.write_row("x", row("joey", 1)).unwrap();
    client.write_row("x", row("yue", 2)).unwrap();
    client.commit_tx().unwrap();
    let objects_before = store.list_prefix_ordered("_table_x_").unwrap().len();

    // The range swallows the whole object: it is tombstoned in the log and
    // no empty replacement is written.
    client.new_tx().unwrap();
    client.delete_rows("x", "b", int_range(1, 2)).unwrap();
    assert!(scan_all(&client, "x").is_empty());
    client.commit_tx().unwrap();

    let objects_after = store.list_prefix_ordered("_table_x_").unwrap().len();
    assert_eq!(objects_after, objects_before);

    let bytes = store.read("_log_00000000000000000001").unwrap();
    let record: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let actions = record["actions"]["x"].as_array().unwrap();
    assert_eq!(actions.len(), 1);
    assert!(actions[0].get("DeleteDataobject").is_some());

    client.new_tx().unwrap();
    assert!(scan_all(&client, "x").is_empty());
    client.commit_tx().unwrap();
}

#[test]
fn test_delete_with_mismatched_types_aborts() {
    let mut client = LakeClient::new(MemoryObjectStore::new());

    client.new_tx().unwrap();
    client.create_table("x", columns(&["a", "b"])).unwrap();
    client.write_row("x", row("joey", 1)).unwrap();

    // Integer range over a string column value.
    assert!(matches!(
        client.delete_rows("x", "a", int_range(1, 2)),
        Err(Error::TypeMismatch)
    ));

    // Mismatched endpoints fail before matching anything.
    let mixed = QueryRange {
        start: Value::Integer(1),
        end: Value::String("z".into()),
    };
    assert!(matches!(
        client.delete_rows("x", "b", mixed),
        Err(Error::TypeMismatch)
    ));

    // The failed deletes left the transaction usable.
    assert_eq!(first_column(&scan_all(&client, "x")), vec!["joey"]);
}

#[test]
fn test_string_range_delete() {
    let mut client = LakeClient::new(MemoryObjectStore::new());

    client.new_tx().unwrap();
    client.create_table("x", columns(&["a", "b"])).unwrap();
    client.write_row("x", row("alice", 1)).unwrap();
    client.write_row("x", row("bob", 2)).unwrap();
    client.write_row("x", row("zoe", 3)).unwrap();

    let range = QueryRange {
        start: Value::String("a".into()),
        end: Value::String("c".into()),
    };
    client.delete_rows("x", "a", range).unwrap();

    assert_eq!(first_column(&scan_all(&client, "x")), vec!["zoe"]);
}
