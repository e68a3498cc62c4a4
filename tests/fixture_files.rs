//! Fixture File Test - tulis `.sdpb`, mmap, decode langsung dari mapping
//!
//! Usage:
//!   cargo test --test fixture_files

use sdp::core::{fixture_path, write_fixture, DecodeArena, FixtureFile, ZeroCopy, FIXTURE_EXTENSION};
use sdp::fixtures::{registry, FixtureMessage};
use sdp::{DecodeOptions, ErrorKind};

#[test]
fn test_generated_fixtures_decode_from_mmap() {
    let dir = tempfile::tempdir().unwrap();
    for (name, sample) in FixtureMessage::samples() {
        write_fixture(fixture_path(dir.path(), name), &sample.to_message().unwrap()).unwrap();
    }

    let registry = registry().unwrap();
    let mut arena = DecodeArena::default();
    for (name, sample) in FixtureMessage::samples() {
        let path = fixture_path(dir.path(), name);
        assert_eq!(path.extension().unwrap(), FIXTURE_EXTENSION);

        let file = FixtureFile::open(&path).unwrap();
        let bytes = file.as_bytes();
        assert_eq!(file.len(), sample.to_message().unwrap().len(), "{name}");
        assert_eq!(FixtureMessage::from_message(bytes).unwrap(), sample, "{name}");

        let msg = registry
            .decode_message(bytes, DecodeOptions::default(), &mut ZeroCopy)
            .unwrap();
        assert!(msg.value == sample.to_value(), "{name}");

        {
            let mut storage = &arena;
            let msg = registry
                .decode_message(bytes, DecodeOptions::default(), &mut storage)
                .unwrap();
            assert!(msg.value == sample.to_value(), "{name}");
        }
        arena.reset();
    }
}

#[test]
fn test_nested_output_directory_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture_path(dir.path().join("a").join("b"), "scene");
    write_fixture(&path, b"SDP2").unwrap();
    let file = FixtureFile::open(&path).unwrap();
    assert_eq!(file.as_bytes(), b"SDP2");
    assert_eq!(file.path(), path.as_path());
}

#[test]
fn test_empty_fixture_is_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture_path(dir.path(), "empty");
    write_fixture(&path, &[]).unwrap();

    let file = FixtureFile::open(&path).unwrap();
    assert!(file.is_empty());
    let err = FixtureMessage::from_message(file.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TruncatedBuffer);
}

#[test]
fn test_missing_fixture_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FixtureFile::open(fixture_path(dir.path(), "missing")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
