//! Tests for Engine
//!
//! These tests verify:
//! - Create/read/delete/overwrite semantics
//! - Capacity accounting and the empty-content sentinel
//! - Restore from an existing backing file
//! - Corruption detection on open
//! - Command execution
//! - Concurrent access patterns

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use flatfs::config::{Config, SyncStrategy};
use flatfs::engine::Engine;
use flatfs::protocol::{decode_name_list, Command};
use flatfs::FlatError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn store_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("fileSystem")
}

fn setup_engine(capacity: u32) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .store_path(store_path(&temp_dir))
        .capacity(capacity)
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    let engine = Engine::open(config).unwrap();
    (temp_dir, engine)
}

fn reopen(temp_dir: &TempDir, capacity: u32) -> Engine {
    Engine::open_path(&store_path(temp_dir), capacity).unwrap()
}

fn patch_file(temp_dir: &TempDir, offset: u64, bytes: &[u8]) {
    let mut file = OpenOptions::new()
        .write(true)
        .open(store_path(temp_dir))
        .unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(bytes).unwrap();
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

// =============================================================================
// Open/Create Tests
// =============================================================================

#[test]
fn test_open_creates_store_with_header() {
    let (temp, engine) = setup_engine(2048);

    let path = store_path(&temp);
    assert!(path.exists());
    assert_eq!(std::fs::read(&path).unwrap(), vec![0, 0, 8, 0, 0, 0, 0, 8]);

    assert_eq!(engine.capacity(), 2048);
    assert_eq!(engine.cursor(), 8);
    assert_eq!(engine.available_space(), 2040);
    assert!(engine.is_empty());
    assert!(!engine.compaction_pending());
    assert_eq!(engine.path(), path.as_path());
}

#[test]
fn test_open_rejects_capacity_below_header() {
    let temp_dir = TempDir::new().unwrap();
    let result = Engine::open_path(&store_path(&temp_dir), 7);

    assert!(matches!(result, Err(FlatError::Config(_))));
    assert!(!store_path(&temp_dir).exists());
}

#[test]
fn test_minimum_capacity_store_is_full() {
    let (_temp, engine) = setup_engine(8);

    assert_eq!(engine.available_space(), 0);
    assert!(matches!(
        engine.append("a", b"b"),
        Err(FlatError::InsufficientSpace { .. })
    ));
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_append_read() {
    let (_temp, engine) = setup_engine(2048);

    engine.append("hello.txt", b"world").unwrap();

    assert_eq!(engine.read("hello.txt").unwrap(), b"world");
    assert!(engine.exists("hello.txt"));
    assert_eq!(engine.len(), 1);
}

#[test]
fn test_read_nonexistent_name() {
    let (_temp, engine) = setup_engine(2048);

    match engine.read("missing") {
        Err(FlatError::NotFound(name)) => assert_eq!(name, "missing"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_append_existing_name_is_rejected() {
    let (_temp, engine) = setup_engine(2048);

    engine.append("file", b"first").unwrap();
    let cursor = engine.cursor();
    let available = engine.available_space();

    match engine.append("file", b"second") {
        Err(FlatError::NameExists(name)) => assert_eq!(name, "file"),
        other => panic!("expected NameExists, got {:?}", other),
    }

    assert_eq!(engine.cursor(), cursor);
    assert_eq!(engine.available_space(), available);
    assert_eq!(engine.read("file").unwrap(), b"first");
}

#[test]
fn test_multiple_entries() {
    let (_temp, engine) = setup_engine(2048);

    for i in 0..10 {
        engine
            .append(&format!("file-{}", i), format!("content {}", i).as_bytes())
            .unwrap();
    }

    for i in 0..10 {
        assert_eq!(
            engine.read(&format!("file-{}", i)).unwrap(),
            format!("content {}", i).into_bytes()
        );
    }

    let expected: Vec<String> = (0..10).map(|i| format!("file-{}", i)).collect();
    assert_eq!(sorted(engine.list()), sorted(expected));
}

#[test]
fn test_unicode_names_and_binary_content() {
    let (_temp, engine) = setup_engine(2048);

    let content = b"\xFF\x00\xAB\xCD\x00";
    engine.append("файл-名前.bin", content).unwrap();

    assert_eq!(engine.read("файл-名前.bin").unwrap(), content);
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_concrete_capacity_scenario() {
    let (_temp, engine) = setup_engine(30);

    engine.append("a", b"abc").unwrap();
    assert_eq!(engine.cursor(), 21);
    assert_eq!(engine.available_space(), 9);
    assert_eq!(engine.read("a").unwrap(), b"abc");

    engine.delete("a").unwrap();
    assert_eq!(engine.available_space(), 9);
    assert!(engine.compaction_pending());

    let stats = engine.compact().unwrap();
    assert_eq!(stats.bytes_reclaimed, 13);
    assert_eq!(stats.records_kept, 0);
    assert_eq!(engine.available_space(), 22);
    assert!(engine.list().is_empty());
}

#[test]
fn test_append_exceeding_capacity_fails() {
    let (_temp, engine) = setup_engine(30);

    engine.append("a", b"abc").unwrap();

    // 9 + 1 + 1 = 11 bytes, only 9 left
    match engine.append("b", b"c") {
        Err(FlatError::InsufficientSpace {
            requested,
            available,
        }) => {
            assert_eq!(requested, 11);
            assert_eq!(available, 9);
        }
        other => panic!("expected InsufficientSpace, got {:?}", other),
    }
    assert_eq!(engine.available_space(), 9);
    assert!(!engine.exists("b"));
}

#[test]
fn test_append_exactly_filling_capacity() {
    let (_temp, engine) = setup_engine(21);

    engine.append("a", b"abc").unwrap();

    assert_eq!(engine.available_space(), 0);
    assert_eq!(engine.read("a").unwrap(), b"abc");
    assert!(matches!(
        engine.append("", b""),
        Err(FlatError::InsufficientSpace { .. })
    ));
}

#[test]
fn test_empty_content_is_stored_as_sentinel() {
    let (temp, engine) = setup_engine(64);

    engine.append("x", b"").unwrap();

    let content = engine.read("x").unwrap();
    assert_eq!(content, vec![0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(i32::from_be_bytes([content[0], content[1], content[2], content[3]]), -1);

    // tombstone, name_len=1, "x", content_len=4, sentinel
    let bytes = std::fs::read(store_path(&temp)).unwrap();
    assert_eq!(
        &bytes[8..22],
        &[0, 0, 0, 0, 1, b'x', 0, 0, 0, 4, 0xFF, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(engine.cursor(), 22);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_hides_entry() {
    let (temp, engine) = setup_engine(2048);

    engine.append("doomed", b"bytes").unwrap();
    let cursor = engine.cursor();

    engine.delete("doomed").unwrap();

    assert!(!engine.exists("doomed"));
    assert!(matches!(engine.read("doomed"), Err(FlatError::NotFound(_))));
    assert!(engine.list().is_empty());

    // Physically still there, only the tombstone byte changed
    assert_eq!(engine.cursor(), cursor);
    let bytes = std::fs::read(store_path(&temp)).unwrap();
    assert_eq!(bytes[8], 1);
    assert_eq!(&bytes[13..19], b"doomed");
}

#[test]
fn test_delete_nonexistent_name() {
    let (_temp, engine) = setup_engine(2048);

    assert!(matches!(engine.delete("ghost"), Err(FlatError::NotFound(_))));
    assert!(!engine.compaction_pending());
}

#[test]
fn test_delete_twice_fails_second_time() {
    let (_temp, engine) = setup_engine(2048);

    engine.append("once", b"x").unwrap();
    engine.delete("once").unwrap();
    assert!(matches!(engine.delete("once"), Err(FlatError::NotFound(_))));
}

#[test]
fn test_name_reusable_after_delete() {
    let (_temp, engine) = setup_engine(2048);

    engine.append("file", b"old").unwrap();
    engine.delete("file").unwrap();
    engine.append("file", b"new").unwrap();

    assert_eq!(engine.read("file").unwrap(), b"new");
}

// =============================================================================
// Overwrite Tests
// =============================================================================

#[test]
fn test_overwrite_replaces_content_and_appends() {
    let (_temp, engine) = setup_engine(2048);

    engine.append("file", b"original").unwrap();
    let cursor_before = engine.cursor();

    engine.overwrite("file", b"overwrittenContent").unwrap();

    assert_eq!(engine.read("file").unwrap(), b"overwrittenContent");
    assert_eq!(engine.len(), 1);
    // The old record is not reused: new record lands at the old cursor
    assert_eq!(
        engine.cursor(),
        cursor_before + 9 + 4 + "overwrittenContent".len() as u32
    );
    assert!(engine.compaction_pending());
}

#[test]
fn test_overwrite_missing_name_creates_it() {
    let (_temp, engine) = setup_engine(2048);

    engine.overwrite("fresh", b"content").unwrap();

    assert_eq!(engine.read("fresh").unwrap(), b"content");
    assert!(!engine.compaction_pending());
}

#[test]
fn test_overwrite_without_space_keeps_old_entry() {
    let (_temp, engine) = setup_engine(40);

    engine.append("f", b"0123456789").unwrap(); // 20 bytes, 12 left
    let available = engine.available_space();

    assert!(matches!(
        engine.overwrite("f", b"abcd"),
        Err(FlatError::InsufficientSpace { .. })
    ));

    assert_eq!(engine.read("f").unwrap(), b"0123456789");
    assert_eq!(engine.available_space(), available);
    assert!(!engine.compaction_pending());
}

// =============================================================================
// Restore Tests
// =============================================================================

#[test]
fn test_restore_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let path = store_path(&temp_dir);

    let (names, available) = {
        let engine = Engine::open_path(&path, 2048).unwrap();
        engine.append("one", b"first").unwrap();
        engine.append("two", b"second").unwrap();
        engine.append("empty", b"").unwrap();
        let snapshot = (sorted(engine.list()), engine.available_space());
        engine.close().unwrap();
        snapshot
    };

    let engine = Engine::open_path(&path, 2048).unwrap();
    assert_eq!(sorted(engine.list()), names);
    assert_eq!(engine.available_space(), available);
    assert_eq!(engine.read("one").unwrap(), b"first");
    assert_eq!(engine.read("two").unwrap(), b"second");
    assert_eq!(engine.read("empty").unwrap(), vec![0xFF; 4]);
    assert!(!engine.compaction_pending());
}

#[test]
fn test_restore_skips_tombstones_and_flags_compaction() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = reopen(&temp_dir, 2048);
        engine.append("keep", b"kept").unwrap();
        engine.append("drop", b"dropped").unwrap();
        engine.delete("drop").unwrap();
        engine.close().unwrap();
    }

    let engine = reopen(&temp_dir, 2048);
    assert_eq!(engine.list(), vec!["keep".to_string()]);
    assert!(!engine.exists("drop"));
    assert!(engine.compaction_pending());
}

#[test]
fn test_reopen_uses_persisted_capacity() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = reopen(&temp_dir, 100);
        engine.append("a", b"abc").unwrap();
    }

    let engine = reopen(&temp_dir, 5000);
    assert_eq!(engine.capacity(), 100);
    assert_eq!(engine.available_space(), 100 - 21);
}

#[test]
fn test_reopen_without_close_keeps_data() {
    let temp_dir = TempDir::new().unwrap();

    {
        let config = Config::builder()
            .store_path(store_path(&temp_dir))
            .capacity(512)
            .sync_strategy(SyncStrategy::EveryNWrites { count: 1000 })
            .build();
        let engine = Engine::open(config).unwrap();
        engine.append("a", b"1").unwrap();
        engine.append("b", b"2").unwrap();
        drop(engine);
    }

    let engine = reopen(&temp_dir, 512);
    assert_eq!(sorted(engine.list()), vec!["a".to_string(), "b".to_string()]);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_cursor_past_end_of_file_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = reopen(&temp_dir, 100);
        engine.append("a", b"abc").unwrap();
    }

    // cursor = 40, file is only 21 bytes long
    patch_file(&temp_dir, 4, &40u32.to_be_bytes());

    let result = Engine::open_path(&store_path(&temp_dir), 100);
    assert!(matches!(result, Err(FlatError::CorruptStore(_))));
}

#[test]
fn test_cursor_past_capacity_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    {
        reopen(&temp_dir, 100);
    }

    patch_file(&temp_dir, 4, &101u32.to_be_bytes());

    let result = Engine::open_path(&store_path(&temp_dir), 100);
    assert!(matches!(result, Err(FlatError::CorruptStore(_))));
}

#[test]
fn test_name_length_past_cursor_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = reopen(&temp_dir, 100);
        engine.append("a", b"abc").unwrap();
    }

    // name_len field of the first record
    patch_file(&temp_dir, 9, &50u32.to_be_bytes());

    let result = Engine::open_path(&store_path(&temp_dir), 100);
    assert!(matches!(result, Err(FlatError::CorruptStore(_))));
}

#[test]
fn test_content_length_past_cursor_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = reopen(&temp_dir, 100);
        engine.append("a", b"abc").unwrap();
    }

    // content_len field: 8 + 1 + 4 + 1 = 14
    patch_file(&temp_dir, 14, &4u32.to_be_bytes());

    let result = Engine::open_path(&store_path(&temp_dir), 100);
    assert!(matches!(result, Err(FlatError::CorruptStore(_))));
}

#[test]
fn test_truncated_header_is_corrupt() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(store_path(&temp_dir), [0u8, 0, 1]).unwrap();

    let result = Engine::open_path(&store_path(&temp_dir), 100);
    assert!(matches!(result, Err(FlatError::CorruptStore(_))));
}

// =============================================================================
// Format Tests
// =============================================================================

#[test]
fn test_format_clears_everything() {
    let (temp, engine) = setup_engine(2048);

    for i in 0..5 {
        engine.append(&format!("file-{}", i), b"data").unwrap();
    }
    engine.delete("file-0").unwrap();

    engine.format().unwrap();

    assert_eq!(engine.available_space(), 2040);
    assert_eq!(engine.capacity(), 2048);
    assert!(engine.list().is_empty());
    assert!(!engine.exists("file-1"));
    assert!(!engine.compaction_pending());
    assert!(store_path(&temp).exists());

    // Usable afterwards, and the state survives a reopen
    engine.append("file-1", b"again").unwrap();
    drop(engine);
    let engine = reopen(&temp, 2048);
    assert_eq!(engine.list(), vec!["file-1".to_string()]);
}

// =============================================================================
// Command Execution Tests
// =============================================================================

#[test]
fn test_execute_create_read_delete() {
    let (_temp, engine) = setup_engine(2048);

    let result = engine
        .execute(Command::Create {
            name: "file".to_string(),
            content: b"value".to_vec(),
        })
        .unwrap();
    assert_eq!(result, None);

    let result = engine
        .execute(Command::Read {
            name: "file".to_string(),
        })
        .unwrap();
    assert_eq!(result, Some(b"value".to_vec()));

    let result = engine
        .execute(Command::Exists {
            name: "file".to_string(),
        })
        .unwrap();
    assert_eq!(result, Some(vec![1]));

    engine
        .execute(Command::Delete {
            name: "file".to_string(),
        })
        .unwrap();
    let result = engine
        .execute(Command::Exists {
            name: "file".to_string(),
        })
        .unwrap();
    assert_eq!(result, Some(vec![0]));
}

#[test]
fn test_execute_list_space_compact() {
    let (_temp, engine) = setup_engine(30);

    engine.append("a", b"abc").unwrap();

    let listed = engine.execute(Command::List).unwrap().unwrap();
    assert_eq!(decode_name_list(&listed).unwrap(), vec!["a".to_string()]);

    let space = engine.execute(Command::Space).unwrap().unwrap();
    assert_eq!(space, 9u32.to_be_bytes().to_vec());

    engine.delete("a").unwrap();
    let reclaimed = engine.execute(Command::Compact).unwrap().unwrap();
    assert_eq!(reclaimed, 13u64.to_be_bytes().to_vec());
}

#[test]
fn test_execute_ping_and_errors() {
    let (_temp, engine) = setup_engine(64);

    assert_eq!(
        engine.execute(Command::Ping).unwrap(),
        Some(b"PONG".to_vec())
    );
    assert!(matches!(
        engine.execute(Command::Read {
            name: "nope".to_string()
        }),
        Err(FlatError::NotFound(_))
    ));
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_reads() {
    let (_temp, engine) = setup_engine(64 * 1024);
    let engine = Arc::new(engine);

    for i in 0..100 {
        engine
            .append(&format!("key{}", i), format!("value{}", i).as_bytes())
            .unwrap();
    }

    let mut handles = vec![];
    for _ in 0..4 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let result = engine_clone.read(&format!("key{}", i)).unwrap();
                assert_eq!(result, format!("value{}", i).into_bytes());
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_writes() {
    let (_temp, engine) = setup_engine(64 * 1024);
    let engine = Arc::new(engine);

    let mut handles = vec![];
    for t in 0..4 {
        let engine_clone = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for i in 0..25 {
                let name = format!("thread{}_key{}", t, i);
                let value = format!("thread{}_value{}", t, i);
                engine_clone.append(&name, value.as_bytes()).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.len(), 100);
    for t in 0..4 {
        for i in 0..25 {
            let result = engine.read(&format!("thread{}_key{}", t, i)).unwrap();
            assert_eq!(result, format!("thread{}_value{}", t, i).into_bytes());
        }
    }
}

#[test]
fn test_concurrent_appends_of_same_name_only_one_wins() {
    let (_temp, engine) = setup_engine(64 * 1024);
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let engine_clone = Arc::clone(&engine);
            thread::spawn(move || engine_clone.append("contended", format!("{}", t).as_bytes()))
        })
        .collect();

    let wins = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|r| r.is_ok())
        .count();

    assert_eq!(wins, 1);
    assert_eq!(engine.len(), 1);
    // exactly one 9 + 9 + 1 byte record was written
    assert_eq!(engine.cursor(), 8 + 19);
}

#[test]
fn test_separate_stores_are_independent() {
    let (_temp_a, a) = setup_engine(100);
    let (_temp_b, b) = setup_engine(200);

    a.append("same", b"in a").unwrap();
    b.append("same", b"in b").unwrap();

    assert_eq!(a.read("same").unwrap(), b"in a");
    assert_eq!(b.read("same").unwrap(), b"in b");

    a.delete("same").unwrap();
    assert!(b.exists("same"));
}
