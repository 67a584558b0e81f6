//! Exit-code contract of the bundled probe/signal plumbing binaries.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn probe_reports_not_running_for_a_missing_pid_file() {
    let dir = TempDir::new().expect("tempdir");

    Command::cargo_bin("dirserve-probe")
        .expect("probe binary")
        .arg(dir.path().join("absent.pid"))
        .assert()
        .code(100)
        .stdout(predicate::str::contains("not running"));
}

#[test]
fn probe_reports_running_for_a_live_pid() {
    let dir = TempDir::new().expect("tempdir");
    let pid_file = dir.path().join("self.pid");
    std::fs::write(&pid_file, format!("{}\n", std::process::id())).expect("write pid");

    Command::cargo_bin("dirserve-probe")
        .expect("probe binary")
        .arg(&pid_file)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("running"));
}

#[test]
fn probe_reports_not_running_for_a_dead_pid() {
    let dir = TempDir::new().expect("tempdir");
    let pid_file = dir.path().join("stale.pid");
    std::fs::write(&pid_file, "999999999\n").expect("write pid");

    Command::cargo_bin("dirserve-probe")
        .expect("probe binary")
        .arg(&pid_file)
        .assert()
        .code(100);
}

#[test]
fn probe_errors_on_a_garbled_pid_file() {
    let dir = TempDir::new().expect("tempdir");
    let pid_file = dir.path().join("bad.pid");
    std::fs::write(&pid_file, "not-a-pid\n").expect("write pid");

    Command::cargo_bin("dirserve-probe")
        .expect("probe binary")
        .arg(&pid_file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("malformed"));
}

#[test]
fn signal_rejects_an_unknown_signal_name() {
    let dir = TempDir::new().expect("tempdir");
    let pid_file = dir.path().join("self.pid");
    std::fs::write(&pid_file, format!("{}\n", std::process::id())).expect("write pid");

    Command::cargo_bin("dirserve-signal")
        .expect("signal binary")
        .args([pid_file.to_str().expect("utf8 path"), "FROB"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported signal"));
}

#[cfg(unix)]
#[test]
fn signal_delivers_term_to_the_recorded_pid() {
    use std::os::unix::process::ExitStatusExt;

    let dir = TempDir::new().expect("tempdir");
    let mut child = std::process::Command::new("sleep")
        .arg("30")
        .spawn()
        .expect("spawn sleep");
    let pid_file = dir.path().join("sleep.pid");
    std::fs::write(&pid_file, format!("{}\n", child.id())).expect("write pid");

    Command::cargo_bin("dirserve-signal")
        .expect("signal binary")
        .args([pid_file.to_str().expect("utf8 path"), "TERM"])
        .assert()
        .success();

    let status = child.wait().expect("wait for sleep");
    assert_eq!(status.signal(), Some(libc_signal_term()));
}

#[cfg(unix)]
fn libc_signal_term() -> i32 {
    // SIGTERM is 15 on every platform this daemon targets.
    15
}
