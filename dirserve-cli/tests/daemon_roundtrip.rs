//! End-to-end: spawn the real daemon, query it over the socket, stop it
//! through the probe/signal lifecycle, and check the runtime artifacts.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use tempfile::TempDir;

fn dirserve_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dirserve"))
}

struct DaemonProcess {
    child: Child,
    binary: PathBuf,
    home: PathBuf,
}

impl DaemonProcess {
    fn start(home: PathBuf) -> Self {
        let binary = dirserve_bin();
        let child = Command::new(&binary)
            .env("HOME", &home)
            .arg("start")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn daemon");

        Self {
            child,
            binary,
            home,
        }
    }

    fn stop(&mut self) {
        let _ = Command::new(&self.binary)
            .env("HOME", &self.home)
            .args(["stop", "--interval-ms", "50"])
            .status();

        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Ok(Some(_)) = self.child.try_wait() {
                return;
            }
            sleep(Duration::from_millis(50));
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for DaemonProcess {
    fn drop(&mut self) {
        self.stop();
    }
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(50));
    }
    false
}

fn write_snapshot(home: &Path) {
    let root = home.join(".dirserve");
    std::fs::create_dir_all(&root).expect("mkdir .dirserve");
    std::fs::write(
        root.join("directory.yaml"),
        concat!(
            "version: 1\n",
            "generated_at: 2026-07-14T09:30:00Z\n",
            "entries:\n",
            "  /x/y: v\n",
            "  /users/alice:\n",
            "    uid: 1001\n",
            "    shell: /bin/zsh\n",
        ),
    )
    .expect("write snapshot");
}

#[test]
fn daemon_serves_lookups_and_stops_cleanly() {
    let home = TempDir::new().expect("home");
    write_snapshot(home.path());

    let socket = home.path().join(".dirserve").join("dirserve.sock");
    let pid_file = home
        .path()
        .join(".dirserve")
        .join("run")
        .join("dirserve.pid");

    let mut daemon = DaemonProcess::start(home.path().to_path_buf());
    assert!(
        wait_until(Duration::from_secs(5), || socket.exists()),
        "daemon socket did not appear in time",
    );
    assert!(pid_file.exists(), "daemon should record its pid");

    let get_output = Command::new(dirserve_bin())
        .env("HOME", home.path())
        .args(["get", "/x/y"])
        .output()
        .expect("run get");
    assert!(
        get_output.status.success(),
        "get failed: {}",
        String::from_utf8_lossy(&get_output.stderr),
    );
    assert!(
        String::from_utf8_lossy(&get_output.stdout).contains("\"v\""),
        "unexpected get output: {}",
        String::from_utf8_lossy(&get_output.stdout),
    );

    let query_output = Command::new(dirserve_bin())
        .env("HOME", home.path())
        .args(["query", "shell", "/bin/zsh"])
        .output()
        .expect("run query");
    assert!(query_output.status.success());
    assert!(
        String::from_utf8_lossy(&query_output.stdout).contains("1001"),
        "unexpected query output: {}",
        String::from_utf8_lossy(&query_output.stdout),
    );

    let status_output = Command::new(dirserve_bin())
        .env("HOME", home.path())
        .args(["status", "--json"])
        .output()
        .expect("run status");
    assert!(status_output.status.success());
    let status: serde_json::Value =
        serde_json::from_slice(&status_output.stdout).expect("status JSON");
    assert_eq!(status["running"], serde_json::Value::Bool(true));

    daemon.stop();

    assert!(
        wait_until(Duration::from_secs(5), || !pid_file.exists()),
        "pid file should be removed after shutdown",
    );
    assert!(
        wait_until(Duration::from_secs(5), || !socket.exists()),
        "socket should be removed after shutdown",
    );
}

#[test]
fn stop_of_never_started_daemon_exits_zero() {
    let home = TempDir::new().expect("home");

    let output = Command::new(dirserve_bin())
        .env("HOME", home.path())
        .arg("stop")
        .output()
        .expect("run stop");

    assert!(
        output.status.success(),
        "stop of absent daemon should exit 0: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("not running"));
}
