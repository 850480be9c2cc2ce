//! Tests for the Dbm facade
//!
//! These tests verify:
//! - Round-trips across every dumper x compression level x smart setting
//! - Replace, delete and missing-key semantics
//! - Bulk inserts with auto-commit off
//! - Iteration, clear, and the dict-style helpers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlite_dbm::{Config, Dbm, DbmError, Dumper};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Order {
    id: u64,
    customer: String,
    lines: Vec<(String, u32)>,
    notes: BTreeMap<String, String>,
    paid: bool,
}

fn sample_orders() -> Vec<Order> {
    let mut notes = BTreeMap::new();
    notes.insert("gift".to_string(), "wrap in blue".to_string());
    vec![
        Order {
            id: 1,
            customer: "ana".to_string(),
            lines: vec![("apple".to_string(), 3), ("pear".to_string(), 1)],
            notes,
            paid: true,
        },
        Order {
            id: 2,
            customer: "bo".repeat(2000),
            lines: Vec::new(),
            notes: BTreeMap::new(),
            paid: false,
        },
    ]
}

fn config(dumper: Dumper, level: u8, smart: bool) -> Config {
    Config::builder()
        .dumper(dumper)
        .compression_level(level)
        .smart_compress(smart)
        .build()
}

fn every_compression() -> Vec<(u8, bool)> {
    vec![(0, true), (0, false), (9, true), (9, false)]
}

fn setup_json_dbm() -> Dbm<Value> {
    Dbm::open_in_memory(config(Dumper::Interchange, 9, true)).unwrap()
}

// =============================================================================
// Round-trip Grid
// =============================================================================

#[test]
fn test_structured_round_trip_grid() {
    for dumper in [Dumper::Native, Dumper::Interchange, Dumper::RawHost] {
        for (level, smart) in every_compression() {
            let mut db: Dbm<Order> = Dbm::open_in_memory(config(dumper, level, smart)).unwrap();
            for order in sample_orders() {
                let key = format!("order:{}", order.id);
                db.set(&key, &order).unwrap();
                assert_eq!(
                    db.get(&key).unwrap(),
                    order,
                    "dumper={} level={} smart={}",
                    dumper,
                    level,
                    smart
                );
            }
        }
    }
}

#[test]
fn test_plain_text_round_trip_grid() {
    let values = ["", "bar", "line one\nline two", "abc".repeat(3000).as_str()].map(String::from);

    for (level, smart) in every_compression() {
        let mut db: Dbm<String> =
            Dbm::open_in_memory(config(Dumper::PlainText, level, smart)).unwrap();
        for (i, value) in values.iter().enumerate() {
            let key = i.to_string();
            db.set(&key, value).unwrap();
            assert_eq!(&db.get(&key).unwrap(), value, "level={} smart={}", level, smart);
        }
    }
}

#[test]
fn test_dynamic_round_trip_grid() {
    let value = json!({"list": ["bar", {"baz": 1}], "n": -7, "f": 0.25, "none": null});
    for dumper in [Dumper::Native, Dumper::Interchange] {
        for (level, smart) in every_compression() {
            let mut db: Dbm<Value> = Dbm::open_in_memory(config(dumper, level, smart)).unwrap();
            db.set("v", &value).unwrap();
            assert_eq!(db.get("v").unwrap(), value);
        }
    }
}

// =============================================================================
// Concrete Scenarios
// =============================================================================

#[test]
fn test_plain_text_set_get_delete() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.sqlite");

    let mut db: Dbm<String> = Dbm::open(&path, config(Dumper::PlainText, 9, true)).unwrap();
    db.set("foo", &"bar".to_string()).unwrap();
    assert_eq!(db.get("foo").unwrap(), "bar");

    db.delete("foo").unwrap();
    assert_eq!(db.len().unwrap(), 0);
    db.close().unwrap();
}

#[test]
fn test_native_nested_value() {
    let mut db: Dbm<Value> = Dbm::open_in_memory(Config::default()).unwrap();
    let value = json!(["bar", {"baz": 1}]);

    db.set("foo", &value).unwrap();

    assert_eq!(db.get("foo").unwrap(), json!(["bar", {"baz": 1}]));
}

#[test]
fn test_native_non_string_keys() {
    let mut grid: BTreeMap<(u8, u8), char> = BTreeMap::new();
    grid.insert((0, 0), 'x');
    grid.insert((2, 1), 'o');

    let mut db: Dbm<BTreeMap<(u8, u8), char>> = Dbm::open_in_memory(Config::default()).unwrap();
    db.set("board", &grid).unwrap();
    assert_eq!(db.get("board").unwrap(), grid);
}

// =============================================================================
// Replace / Delete Semantics
// =============================================================================

#[test]
fn test_replace_keeps_length() {
    let mut db = setup_json_dbm();

    db.set("k", &json!("v1")).unwrap();
    let before = db.len().unwrap();
    db.set("k", &json!({"v": 2})).unwrap();

    assert_eq!(db.get("k").unwrap(), json!({"v": 2}));
    assert_eq!(db.len().unwrap(), before);
}

#[test]
fn test_delete_then_miss() {
    let mut db = setup_json_dbm();
    db.set("keep", &json!(1)).unwrap();
    db.set("k", &json!(2)).unwrap();
    let before = db.len().unwrap();

    db.delete("k").unwrap();

    assert!(matches!(db.get("k"), Err(DbmError::KeyNotFound(ref key)) if key == "k"));
    assert_eq!(db.len().unwrap(), before - 1);
    assert!(!db.contains("k").unwrap());
}

#[test]
fn test_delete_missing_is_noop() {
    let mut db = setup_json_dbm();
    db.set("a", &json!(1)).unwrap();

    db.delete("never-set").unwrap();
    db.delete("never-set").unwrap();

    assert_eq!(db.len().unwrap(), 1);
}

#[test]
fn test_get_missing() {
    let db = setup_json_dbm();
    let err = db.get("missing").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Key not found: missing");
}

#[test]
fn test_rejected_value_leaves_state_unchanged() {
    let mut db: Dbm<Value> = Dbm::open_in_memory(config(Dumper::PlainText, 9, true)).unwrap();
    db.set("k", &json!("original")).unwrap();

    let err = db.set("k", &json!(["not", "text"])).unwrap_err();
    assert!(matches!(err, DbmError::Type(_)));

    let err = db.set("new", &json!(42)).unwrap_err();
    assert!(matches!(err, DbmError::Type(_)));

    assert_eq!(db.get("k").unwrap(), json!("original"));
    assert_eq!(db.len().unwrap(), 1);
}

#[test]
fn test_interchange_rejects_before_write() {
    let mut db: Dbm<BTreeMap<(u8, u8), char>> =
        Dbm::open_in_memory(config(Dumper::Interchange, 0, false)).unwrap();
    let mut grid = BTreeMap::new();
    grid.insert((1, 1), 'x');

    let err = db.set("board", &grid).unwrap_err();
    assert!(matches!(err, DbmError::Encode(_)));
    assert!(db.is_empty().unwrap());
}

#[test]
fn test_interchange_rejects_non_finite_floats() {
    let mut db: Dbm<Vec<f64>> =
        Dbm::open_in_memory(config(Dumper::Interchange, 9, true)).unwrap();
    db.set("finite", &vec![0.5, -2.0]).unwrap();

    for bad in [vec![f64::NAN], vec![1.0, f64::INFINITY], vec![f64::NEG_INFINITY]] {
        let err = db.set("bad", &bad).unwrap_err();
        assert!(matches!(err, DbmError::Encode(_)), "got {:?}", err);
    }

    assert_eq!(db.len().unwrap(), 1);
    assert!(!db.contains("bad").unwrap());
    assert_eq!(db.get("finite").unwrap(), vec![0.5, -2.0]);
}

#[test]
fn test_interchange_rejects_integer_keys() {
    let mut db: Dbm<BTreeMap<u32, String>> =
        Dbm::open_in_memory(config(Dumper::Interchange, 0, false)).unwrap();
    let mut by_id = BTreeMap::new();
    by_id.insert(7, "a".to_string());

    let err = db.set("ids", &by_id).unwrap_err();
    assert!(matches!(err, DbmError::Encode(_)), "got {:?}", err);
    assert_eq!(db.len().unwrap(), 0);
}

#[test]
fn test_plain_text_optional_and_newtype_values() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Name(String);

    let mut db: Dbm<Option<String>> =
        Dbm::open_in_memory(config(Dumper::PlainText, 9, true)).unwrap();
    db.set("o", &Some("hi".to_string())).unwrap();
    assert_eq!(db.get("o").unwrap(), Some("hi".to_string()));

    let mut names: Dbm<Name> =
        Dbm::open_in_memory(config(Dumper::PlainText, 9, true)).unwrap();
    names.set("n", &Name("ada".to_string())).unwrap();
    assert_eq!(names.get("n").unwrap(), Name("ada".to_string()));
}

#[test]
fn test_raw_host_rejects_values_that_cannot_read_back() {
    let mut dynamic: Dbm<Value> =
        Dbm::open_in_memory(config(Dumper::RawHost, 9, true)).unwrap();
    let err = dynamic.set("doc", &json!({"a": 1})).unwrap_err();
    assert!(matches!(err, DbmError::Encode(_)), "got {:?}", err);
    assert_eq!(dynamic.len().unwrap(), 0);

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sparse {
        count: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    }

    let mut sparse: Dbm<Sparse> =
        Dbm::open_in_memory(config(Dumper::RawHost, 0, false)).unwrap();
    let err = sparse
        .set("s", &Sparse { count: 7, note: None })
        .unwrap_err();
    assert!(matches!(err, DbmError::Encode(_)), "got {:?}", err);
    assert!(sparse.is_empty().unwrap());

    let full = Sparse {
        count: 7,
        note: Some("kept".to_string()),
    };
    sparse.set("s", &full).unwrap();
    assert_eq!(sparse.get("s").unwrap(), full);
}

// =============================================================================
// Bulk Insert Tests
// =============================================================================

#[test]
fn test_bulk_insert_then_commit() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bulk.sqlite");
    let bulk = Config::builder()
        .dumper(Dumper::PlainText)
        .auto_commit(false)
        .build();

    let mut db: Dbm<String> = Dbm::open(&path, bulk).unwrap();
    for i in 0..1000 {
        db.set(&i.to_string(), &"foo".to_string()).unwrap();
    }
    assert!(db.has_pending());
    db.commit().unwrap();
    assert_eq!(db.len().unwrap(), 1000);

    db.clear().unwrap();
    db.close().unwrap();

    let db: Dbm<String> = Dbm::open(&path, config(Dumper::PlainText, 9, true)).unwrap();
    assert_eq!(db.len().unwrap(), 0);
}

#[test]
fn test_bulk_insert_lost_without_commit() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("crash.sqlite");
    let bulk = Config::builder().auto_commit(false).build();

    let mut db: Dbm<u32> = Dbm::open(&path, bulk).unwrap();
    for i in 0..1000u32 {
        db.set(&format!("key{}", i), &i).unwrap();
    }
    // Uncommitted writes are visible on the writing handle
    assert_eq!(db.len().unwrap(), 1000);
    assert_eq!(db.get("key500").unwrap(), 500);

    // Simulated crash: the handle goes away without commit or close
    drop(db);

    let db: Dbm<u32> = Dbm::open(&path, Config::default()).unwrap();
    assert_eq!(db.len().unwrap(), 0);
}

#[test]
fn test_close_commits_pending_writes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("close.sqlite");

    let mut db: Dbm<u32> = Dbm::open(&path, Config::builder().auto_commit(false).build()).unwrap();
    db.set("a", &1).unwrap();
    db.close().unwrap();

    let db: Dbm<u32> = Dbm::open(&path, Config::default()).unwrap();
    assert_eq!(db.get("a").unwrap(), 1);
}

#[test]
fn test_toggle_auto_commit() {
    let mut db: Dbm<u32> = Dbm::open_in_memory(Config::default()).unwrap();
    assert!(db.auto_commit());

    db.set_auto_commit(false).unwrap();
    db.set("a", &1).unwrap();
    assert!(db.has_pending());

    db.set_auto_commit(true).unwrap();
    assert!(!db.has_pending());
    db.set("b", &2).unwrap();
    assert!(!db.has_pending());
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_keys_and_iter_sorted() {
    let mut db = setup_json_dbm();
    for key in ["delta", "alpha", "charlie", "bravo"] {
        db.set(key, &json!(key)).unwrap();
    }

    assert_eq!(db.keys().unwrap(), vec!["alpha", "bravo", "charlie", "delta"]);

    let lazy: Vec<String> = db.iter().map(Result::unwrap).collect();
    assert_eq!(lazy, db.keys().unwrap());

    // Restartable
    assert_eq!(db.iter().count(), 4);
    assert_eq!(db.iter().count(), 4);
}

#[test]
fn test_items_and_values() {
    let mut db: Dbm<u32> = Dbm::open_in_memory(Config::default()).unwrap();
    db.update([("b", 2), ("a", 1), ("c", 3)]).unwrap();

    let items: Vec<(String, u32)> = db.items().collect::<Result<_, _>>().unwrap();
    assert_eq!(
        items,
        vec![("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)]
    );

    let values: Vec<u32> = db.values().collect::<Result<_, _>>().unwrap();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn test_clear_resets() {
    let mut db = setup_json_dbm();
    for i in 0..25 {
        db.set(&format!("k{}", i), &json!(i)).unwrap();
    }

    db.clear().unwrap();

    assert_eq!(db.len().unwrap(), 0);
    assert!(db.is_empty().unwrap());
    assert!(db.iter().next().is_none());
    assert!(db.keys().unwrap().is_empty());
}

// =============================================================================
// Dict Helper Tests
// =============================================================================

#[test]
fn test_get_opt_and_get_or() {
    let mut db: Dbm<String> = Dbm::open_in_memory(config(Dumper::PlainText, 0, false)).unwrap();
    db.set("a", &"x".to_string()).unwrap();

    assert_eq!(db.get_opt("a").unwrap(), Some("x".to_string()));
    assert_eq!(db.get_opt("b").unwrap(), None);
    assert_eq!(db.get_or("b", "fallback".to_string()).unwrap(), "fallback");
    assert!(!db.contains("b").unwrap());
}

#[test]
fn test_pop() {
    let mut db: Dbm<u32> = Dbm::open_in_memory(Config::default()).unwrap();
    db.set("a", &7).unwrap();

    assert_eq!(db.pop("a").unwrap(), Some(7));
    assert_eq!(db.pop("a").unwrap(), None);
    assert!(db.is_empty().unwrap());
}

#[test]
fn test_set_default() {
    let mut db: Dbm<u32> = Dbm::open_in_memory(Config::default()).unwrap();

    assert_eq!(db.set_default("hits", 0).unwrap(), 0);
    db.set("hits", &5).unwrap();
    assert_eq!(db.set_default("hits", 0).unwrap(), 5);
    assert_eq!(db.len().unwrap(), 1);
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_open_rejects_bad_level() {
    let result: Result<Dbm<Value>, _> =
        Dbm::open_in_memory(Config::builder().compression_level(12).build());
    assert!(matches!(result, Err(DbmError::Config(_))));
}

#[test]
fn test_open_with_memory_marker() {
    let mut db: Dbm<u32> = sqlite_dbm::open(":memory:", Config::default()).unwrap();
    assert!(db.location().is_memory());
    db.set("a", &1).unwrap();
    assert_eq!(db.get("a").unwrap(), 1);
}

#[test]
fn test_handle_reports_configuration() {
    let db: Dbm<Value> = Dbm::open_in_memory(config(Dumper::Interchange, 3, false)).unwrap();
    assert_eq!(db.codec().dumper(), Dumper::Interchange);
    assert_eq!(db.compressor().level(), 3);
    assert!(!db.compressor().is_smart());
}
