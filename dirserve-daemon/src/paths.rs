use std::path::{Path, PathBuf};

pub const DAEMON_LABEL: &str = "dev.dirserve.daemon";

pub const DAEMON_SOCKET: &str = "dirserve.sock";
pub const DAEMON_PID_FILE: &str = "dirserve.pid";
pub const DIRECTORY_SNAPSHOT: &str = "directory.yaml";

pub fn dirserve_root(home: &Path) -> PathBuf {
    home.join(".dirserve")
}

pub fn run_dir(home: &Path) -> PathBuf {
    dirserve_root(home).join("run")
}

pub fn socket_path(home: &Path) -> PathBuf {
    dirserve_root(home).join(DAEMON_SOCKET)
}

pub fn pid_path(home: &Path) -> PathBuf {
    run_dir(home).join(DAEMON_PID_FILE)
}

pub fn snapshot_path(home: &Path) -> PathBuf {
    dirserve_root(home).join(DIRECTORY_SNAPSHOT)
}
