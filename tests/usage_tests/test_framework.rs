use std::io::Write;
use std::process::{Command, Stdio};

use regex::Regex;
use tempfile::TempDir;

/// Description of a single end-to-end test which runs the blockpipe binary.
#[derive(Default)]
pub struct TestDesc {
    /// Files to create inside the test's temporary folder before running.
    pub setup_files: Vec<(&'static str, Vec<u8>)>,
    /// Arguments passed to blockpipe. "$TEMP" in an argument is replaced with the
    /// path of the temporary folder.
    pub args: Vec<String>,
    /// Bytes fed to blockpipe's stdin.
    pub stdin: Vec<u8>,
    /// The expected exit code (0 for success).
    pub expected_exit_code: i32,
    /// The exact bytes expected on stdout, if specified.
    pub expected_stdout: Option<Vec<u8>>,
    /// Messages expected on stderr, along with the expected number of occurrences
    /// (use zero to assert that a message does _not_ appear).
    pub expected_stderr_messages: Vec<(usize, Regex)>,
    /// Files expected inside the temporary folder afterwards, with their exact contents.
    pub expected_files: Vec<(&'static str, Vec<u8>)>,
}

/// Convenience for TestDesc::args.
pub fn args(a: &[&str]) -> Vec<String> {
    a.iter().map(|s| s.to_string()).collect()
}

pub fn run(mut desc: TestDesc) {
    // Create a temporary folder for any test files
    let temp_folder = TempDir::new().unwrap();

    for (name, contents) in &desc.setup_files {
        std::fs::write(temp_folder.path().join(name), contents).unwrap();
    }

    // All paths provided in TestDesc have $TEMP replaced with the temporary folder
    let substitute_vars = |a: &str| a.replace("$TEMP", &temp_folder.path().to_string_lossy());

    let mut child = Command::new(env!("CARGO_BIN_EXE_blockpipe"))
        .args(desc.args.iter().map(|a| substitute_vars(a)))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to launch blockpipe");

    // Feed stdin from a separate thread, in case the child fills up its stdout pipe
    // before it has consumed all of its stdin (reading and writing from here would deadlock).
    let mut child_stdin = child.stdin.take().unwrap();
    let stdin_data = std::mem::take(&mut desc.stdin);
    let stdin_writer = std::thread::spawn(move || {
        // The child may exit without reading all of its input (e.g. on a usage error),
        // so a failed write here is not itself a test failure.
        let _ = child_stdin.write_all(&stdin_data);
    });

    let output = child.wait_with_output().expect("Failed to wait for blockpipe");
    stdin_writer.join().unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    // Check exit code
    assert_eq!(output.status.code(), Some(desc.expected_exit_code), "stderr was: {stderr}");

    // Check the copied bytes
    if let Some(expected) = &desc.expected_stdout {
        assert_eq!(&output.stdout, expected);
    }

    // Check for expected stderr messages
    for (n, r) in &desc.expected_stderr_messages {
        let actual_matches = r.find_iter(&stderr).count();
        assert_eq!(actual_matches, *n, "matches of '{r}' in stderr: {stderr}");
    }

    // Check the filesystem is as expected afterwards
    for (name, contents) in &desc.expected_files {
        let actual = std::fs::read(temp_folder.path().join(name)).unwrap();
        assert_eq!(&actual, contents, "contents of '{name}'");
    }
}
