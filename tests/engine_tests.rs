//! Tests for Engine
//!
//! These tests verify:
//! - Basic set/get operations
//! - Size-threshold rotation and the sealed-segment lifecycle
//! - Global last-write-wins across rotations
//! - Persistence and recovery across reopen
//! - Corruption resilience during replay
//! - Startup discovery of segment files

use std::path::Path;

use segkv::record::{decode, DELIMITER};
use segkv::{Config, Engine, SegKvError, SyncStrategy};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn config_for(path: &Path, limit: u64) -> Config {
    Config::builder()
        .data_dir(path)
        .segment_size_limit(limit)
        .build()
}

fn setup_temp_engine(limit: u64) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(config_for(temp_dir.path(), limit)).unwrap();
    (temp_dir, engine)
}

fn segment_files(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
        .collect();
    files.sort();
    files
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_creates_directory_and_first_segment() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("mydb");

    let engine = Engine::open(config_for(&data_dir, 1024)).unwrap();

    assert!(data_dir.exists());
    assert!(data_dir.join("segment_000001.log").exists());
    assert_eq!(engine.segment_count(), 1);
    assert_eq!(engine.active_segment_id(), 1);
}

#[test]
fn test_set_get() {
    let (_temp, mut engine) = setup_temp_engine(1024);

    engine.set(1, b"hello").unwrap();

    assert_eq!(engine.get(1).unwrap(), Some(b"hello".to_vec()));
}

#[test]
fn test_get_nonexistent_key() {
    let (_temp, engine) = setup_temp_engine(1024);

    assert_eq!(engine.get(42).unwrap(), None);
}

#[test]
fn test_overwrite_within_segment() {
    let (_temp, mut engine) = setup_temp_engine(1024);

    engine.set(1, b"value1").unwrap();
    engine.set(1, b"value2").unwrap();

    assert_eq!(engine.get(1).unwrap(), Some(b"value2".to_vec()));
}

#[test]
fn test_multiple_keys() {
    let (_temp, mut engine) = setup_temp_engine(1024);

    engine.set(1, b"one").unwrap();
    engine.set(2, b"two").unwrap();
    engine.set(-3, b"minus three").unwrap();

    assert_eq!(engine.get(1).unwrap(), Some(b"one".to_vec()));
    assert_eq!(engine.get(2).unwrap(), Some(b"two".to_vec()));
    assert_eq!(engine.get(-3).unwrap(), Some(b"minus three".to_vec()));
}

#[test]
fn test_delimiter_in_value_rejected() {
    let (_temp, mut engine) = setup_temp_engine(1024);

    let result = engine.set(1, b"a\x00b");
    assert!(matches!(result, Err(SegKvError::DelimiterInValue)));

    // The engine stays usable and nothing was written
    assert_eq!(engine.active_total_bytes(), 0);
    engine.set(1, b"ok").unwrap();
    assert_eq!(engine.get(1).unwrap(), Some(b"ok".to_vec()));
}

// =============================================================================
// Rotation Tests
// =============================================================================

#[test]
fn test_rotation_at_threshold() {
    // Threshold 20: "1,11\0" style records are 5 bytes each
    let (_temp, mut engine) = setup_temp_engine(20);

    engine.set(1, b"11").unwrap();
    engine.set(2, b"21").unwrap();
    engine.set(3, b"31").unwrap();
    assert_eq!(engine.segment_count(), 1);

    // "4,4100\0" is 7 bytes: 15 + 7 > 20 → segment 2
    engine.set(4, b"4100").unwrap();
    assert_eq!(engine.segment_count(), 2);
    assert_eq!(engine.active_segment_id(), 2);

    // Keys written before the rotation stay retrievable from segment 1
    assert_eq!(engine.get(1).unwrap(), Some(b"11".to_vec()));
    assert_eq!(engine.get(4).unwrap(), Some(b"4100".to_vec()));
}

#[test]
fn test_record_exactly_filling_threshold_does_not_rotate() {
    let (_temp, mut engine) = setup_temp_engine(20);

    for key in 1..=4 {
        engine.set(key, b"vv").unwrap(); // 5 bytes each
    }

    assert_eq!(engine.segment_count(), 1);
    assert_eq!(engine.active_total_bytes(), 20);

    // The next record pushes past the limit
    engine.set(5, b"vv").unwrap();
    assert_eq!(engine.segment_count(), 2);
}

#[test]
fn test_last_write_wins_across_rotation() {
    let (_temp, mut engine) = setup_temp_engine(10);

    engine.set(1, b"aa").unwrap();
    engine.set(2, b"bb").unwrap();
    engine.set(1, b"cc").unwrap(); // lands in segment 2

    assert_eq!(engine.segment_count(), 2);
    assert_eq!(engine.get(1).unwrap(), Some(b"cc".to_vec()));
    assert_eq!(engine.get(2).unwrap(), Some(b"bb".to_vec()));
}

#[test]
fn test_oversized_record_lands_whole() {
    let (_temp, mut engine) = setup_temp_engine(10);

    let big = b"a value much longer than the segment limit";
    engine.set(1, big).unwrap();

    // An empty active segment takes the record without rotating
    assert_eq!(engine.segment_count(), 1);
    assert_eq!(engine.get(1).unwrap(), Some(big.to_vec()));

    // The next write rotates away from the now-over-limit segment
    engine.set(2, b"x").unwrap();
    assert_eq!(engine.segment_count(), 2);
    assert_eq!(engine.get(2).unwrap(), Some(b"x".to_vec()));
}

#[test]
fn test_no_record_split_across_segment_files() {
    let (temp, mut engine) = setup_temp_engine(12);

    for key in 1..=6 {
        engine.set(key, b"vv").unwrap();
    }
    drop(engine);

    // Every segment file must parse standalone: complete frames only
    let files = segment_files(temp.path());
    assert!(files.len() > 1);

    for file in files {
        let bytes = std::fs::read(&file).unwrap();
        assert_eq!(bytes.last(), Some(&DELIMITER));

        for frame in bytes.split(|&b| b == DELIMITER) {
            if !frame.is_empty() {
                decode(frame).unwrap();
            }
        }
    }
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_persistence_across_reopen() {
    let temp_dir = TempDir::new().unwrap();

    // Write across several rotations, then drop
    {
        let mut engine = Engine::open(config_for(temp_dir.path(), 30)).unwrap();
        for key in 0..10 {
            let value = format!("value{}", key);
            engine.set(key, value.as_bytes()).unwrap();
        }
        assert!(engine.segment_count() > 1);
    }

    // Reopen and verify every key replays to the same value
    {
        let engine = Engine::open(config_for(temp_dir.path(), 30)).unwrap();
        for key in 0..10 {
            let expected = format!("value{}", key);
            assert_eq!(engine.get(key).unwrap(), Some(expected.into_bytes()));
        }
    }
}

#[test]
fn test_reopen_continues_filling_active_segment() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = Engine::open(config_for(temp_dir.path(), 20)).unwrap();
        engine.set(1, b"aa").unwrap();
        engine.set(2, b"bb").unwrap();
    }

    {
        let mut engine = Engine::open(config_for(temp_dir.path(), 20)).unwrap();
        assert_eq!(engine.segment_count(), 1);
        assert_eq!(engine.active_segment_id(), 1);
        assert_eq!(engine.active_total_bytes(), 10);

        // Still room for two more 5-byte records before rotation
        engine.set(3, b"cc").unwrap();
        engine.set(4, b"dd").unwrap();
        assert_eq!(engine.segment_count(), 1);

        engine.set(5, b"ee").unwrap();
        assert_eq!(engine.segment_count(), 2);
    }
}

#[test]
fn test_segment_ids_continue_after_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = Engine::open(config_for(temp_dir.path(), 10)).unwrap();
        for key in 1..=5 {
            engine.set(key, b"vv").unwrap();
        }
        assert_eq!(engine.segment_count(), 3);
        assert_eq!(engine.active_segment_id(), 3);
    }

    {
        let mut engine = Engine::open(config_for(temp_dir.path(), 10)).unwrap();
        assert_eq!(engine.segment_count(), 3);
        assert_eq!(engine.active_segment_id(), 3);

        // Fill the active segment and force one more rotation
        engine.set(6, b"vv").unwrap();
        engine.set(7, b"vv").unwrap();

        assert_eq!(engine.active_segment_id(), 4);
        assert!(temp_dir.path().join("segment_000004.log").exists());
    }
}

#[test]
fn test_close_then_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = Engine::open(config_for(temp_dir.path(), 1024)).unwrap();
        engine.set(1, b"durable").unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(config_for(temp_dir.path(), 1024)).unwrap();
    assert_eq!(engine.get(1).unwrap(), Some(b"durable".to_vec()));
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_corruption_resilience() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = Engine::open(config_for(temp_dir.path(), 1024)).unwrap();
        engine.set(1, b"one").unwrap();
        engine.set(2, b"two").unwrap();
        engine.set(3, b"three").unwrap();
    }

    // Corrupt the middle record: replace its comma so the frame no longer
    // parses, leaving the file length unchanged
    let path = temp_dir.path().join("segment_000001.log");
    let mut bytes = std::fs::read(&path).unwrap();
    let pos = bytes
        .windows(5)
        .position(|window| window == b"2,two")
        .unwrap();
    bytes[pos + 1] = b'x';
    std::fs::write(&path, &bytes).unwrap();

    // Replay drops the corrupt record and keeps the rest
    let engine = Engine::open(config_for(temp_dir.path(), 1024)).unwrap();
    assert_eq!(engine.get(1).unwrap(), Some(b"one".to_vec()));
    assert_eq!(engine.get(2).unwrap(), None);
    assert_eq!(engine.get(3).unwrap(), Some(b"three".to_vec()));
}

#[test]
fn test_ignores_foreign_files() {
    let temp_dir = TempDir::new().unwrap();

    {
        let mut engine = Engine::open(config_for(temp_dir.path(), 1024)).unwrap();
        engine.set(1, b"one").unwrap();
    }

    std::fs::write(temp_dir.path().join("random.txt"), b"not a segment").unwrap();
    std::fs::write(temp_dir.path().join("segment_abc.log"), b"bad id").unwrap();
    std::fs::write(temp_dir.path().join("other_000001.log"), b"wrong prefix").unwrap();

    let engine = Engine::open(config_for(temp_dir.path(), 1024)).unwrap();
    assert_eq!(engine.segment_count(), 1);
    assert_eq!(engine.get(1).unwrap(), Some(b"one".to_vec()));
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_zero_segment_limit_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let result = Engine::open(config_for(temp_dir.path(), 0));
    assert!(matches!(result, Err(SegKvError::Config(_))));
}

#[test]
fn test_custom_file_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .file_prefix("shard")
        .segment_size_limit(1024)
        .build();

    {
        let mut engine = Engine::open(config.clone()).unwrap();
        engine.set(1, b"one").unwrap();
    }

    assert!(temp_dir.path().join("shard_000001.log").exists());

    let engine = Engine::open(config).unwrap();
    assert_eq!(engine.get(1).unwrap(), Some(b"one".to_vec()));
}

#[test]
fn test_batched_sync_strategy() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .segment_size_limit(1024)
        .sync_strategy(SyncStrategy::EveryNRecords { count: 10 })
        .build();

    let mut engine = Engine::open(config).unwrap();
    for key in 0..25 {
        engine.set(key, b"batched").unwrap();
    }
    for key in 0..25 {
        assert_eq!(engine.get(key).unwrap(), Some(b"batched".to_vec()));
    }
    engine.close().unwrap();
}
