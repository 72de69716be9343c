use crate::test_framework::{args, run, TestDesc};

use rand::RngCore;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut data);
    data
}

#[test]
fn file_to_file_copy() {
    let data = random_bytes(10_000);
    run(TestDesc {
        setup_files: vec![("input.dat", data.clone())],
        args: args(&["if=$TEMP/input.dat", "of=$TEMP/output.dat", "bs=333"]),
        expected_exit_code: 0,
        expected_files: vec![("output.dat", data)],
        ..Default::default()
    });
}

/// File input takes the real-seek path for skip= rather than reading and discarding.
#[test]
fn file_skip_and_count() {
    run(TestDesc {
        setup_files: vec![("input.dat", b"hello world.....".to_vec())],
        args: args(&["if=$TEMP/input.dat", "of=$TEMP/out.dat", "ibs=1", "skip=6", "count=5"]),
        expected_exit_code: 0,
        expected_files: vec![("out.dat", b"world".to_vec())],
        ..Default::default()
    });
}

/// Skipping past the end of a seekable input isn't an error - there's just nothing
/// left to copy.
#[test]
fn file_skip_past_end_copies_nothing() {
    run(TestDesc {
        setup_files: vec![("input.dat", b"abc".to_vec())],
        args: args(&["if=$TEMP/input.dat", "of=$TEMP/out.dat", "ibs=1", "skip=100"]),
        expected_exit_code: 0,
        expected_files: vec![("out.dat", vec![])],
        ..Default::default()
    });
}

#[test]
fn output_is_truncated_by_default() {
    run(TestDesc {
        setup_files: vec![("out.dat", b"abcdefghijklmnopqrstuvwxyz".to_vec())],
        args: args(&["of=$TEMP/out.dat"]),
        stdin: b"XXXXX".to_vec(),
        expected_exit_code: 0,
        expected_files: vec![("out.dat", b"XXXXX".to_vec())],
        ..Default::default()
    });
}

#[test]
fn notrunc_preserves_the_tail_of_the_output() {
    run(TestDesc {
        setup_files: vec![("out.dat", b"abcdefghijklmnopqrstuvwxyz".to_vec())],
        args: args(&["of=$TEMP/out.dat", "conv=notrunc"]),
        stdin: b"XXXXX".to_vec(),
        expected_exit_code: 0,
        expected_files: vec![("out.dat", b"XXXXXfghijklmnopqrstuvwxyz".to_vec())],
        ..Default::default()
    });
}

/// seek= on a fresh output file leaves a zero-filled gap before the copied data.
#[test]
fn seek_offsets_into_the_output() {
    let mut expected = vec![0u8; 10];
    expected.extend_from_slice(b"ab");
    run(TestDesc {
        args: args(&["of=$TEMP/out.dat", "obs=5", "seek=2"]),
        stdin: b"ab".to_vec(),
        expected_exit_code: 0,
        expected_files: vec![("out.dat", expected)],
        ..Default::default()
    });
}

#[test]
fn file_to_stdout() {
    let data = random_bytes(4096);
    run(TestDesc {
        setup_files: vec![("input.dat", data.clone())],
        args: args(&["if=$TEMP/input.dat", "bs=1000"]),
        expected_exit_code: 0,
        expected_stdout: Some(data),
        ..Default::default()
    });
}
