//! Integration tests for the `osdman` binary entry point.
//!
//! Covers usage errors, completions from a real configuration file, and a
//! full daemon round trip driven through the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin_cmd;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use predicates::str::contains;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = dir.path().join("config.yaml");
        let socket = dir.path().join("osdcmd.sock");
        let display = dir.path().join("display.out");
        let yaml = format!(
            concat!(
                "domains:\n",
                "  volume:\n",
                "    stat_cmd: \"echo 55\"\n",
                "    verbs:\n",
                "      up: {{ cmd: \"true\" }}\n",
                "      down: {{ cmd: \"true\" }}\n",
                "  brightness:\n",
                "    stat_cmd: \"echo 10\"\n",
                "log_format: compact\n",
                "shell: sh\n",
                "display_cmd: \"cat > '{display}'\"\n",
                "socket_path: \"{socket}\"\n",
            ),
            display = display.display(),
            socket = socket.display(),
        );
        fs::write(&config, yaml).expect("write config");
        Self { dir, config }
    }

    fn socket(&self) -> PathBuf {
        self.dir.path().join("osdcmd.sock")
    }

    fn display_output(&self) -> String {
        fs::read_to_string(self.dir.path().join("display.out")).unwrap_or_default()
    }

    fn osdman(&self) -> assert_cmd::Command {
        let mut command = cargo_bin_cmd!("osdman");
        command.arg("--config-path").arg(&self.config);
        command
    }

    fn spawn_daemon(&self) -> Child {
        Command::new(env!("CARGO_BIN_EXE_osdman"))
            .arg("--config-path")
            .arg(&self.config)
            .arg("daemon")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn daemon")
    }
}

fn wait_until(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    false
}

fn terminate(child: &mut Child) {
    let pid = i32::try_from(child.id()).expect("pid fits in i32");
    kill(Pid::from_raw(pid), Signal::SIGTERM).expect("signal daemon");
}

#[test]
fn help_lists_subcommands() {
    cargo_bin_cmd!("osdman")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("call"))
        .stdout(contains("daemon"));
}

#[test]
fn call_requires_domain_and_verb() {
    cargo_bin_cmd!("osdman")
        .args(["call", "volume"])
        .assert()
        .failure()
        .stderr(contains("VERB"));
}

#[test]
fn missing_configuration_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    cargo_bin_cmd!("osdman")
        .arg("--config-path")
        .arg(dir.path().join("absent.yaml"))
        .arg("complete")
        .assert()
        .failure()
        .stderr(contains("failed to load configuration"));
}

#[test]
fn completes_domains_and_verbs_from_file() {
    let workspace = Workspace::new();
    workspace
        .osdman()
        .arg("complete")
        .assert()
        .success()
        .stdout("brightness\nvolume\n");
    workspace
        .osdman()
        .args(["complete", "volume"])
        .assert()
        .success()
        .stdout("down\nup\n");
}

#[test]
fn completion_script_needs_no_configuration() {
    let dir = tempfile::tempdir().expect("temp dir");
    cargo_bin_cmd!("osdman")
        .env("OSDMAN_CONFIG_PATH", dir.path().join("absent.yaml"))
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(contains("_osdman()"))
        .stdout(contains("complete -F _osdman_dynamic"));
}

#[test]
fn bash_completion_offers_configured_verbs() {
    let workspace = Workspace::new();
    let binary = Path::new(env!("CARGO_BIN_EXE_osdman"));
    let bin_dir = binary.parent().expect("binary directory");
    let path = format!(
        "{}:{}",
        bin_dir.display(),
        std::env::var("PATH").unwrap_or_default()
    );
    let script = concat!(
        "source <(osdman completion bash)\n",
        "COMP_WORDS=(osdman call volume '')\n",
        "COMP_CWORD=3\n",
        "_osdman_dynamic\n",
        "printf '%s\\n' \"${COMPREPLY[@]}\"\n",
    );

    let output = Command::new("bash")
        .arg("-c")
        .arg(script)
        .env("PATH", path)
        .env("OSDMAN_CONFIG_PATH", &workspace.config)
        .output()
        .expect("run bash");

    assert!(output.status.success(), "bash failed: {output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "down\nup\n");
}

#[test]
fn call_without_daemon_fails() {
    let workspace = Workspace::new();
    workspace
        .osdman()
        .args(["call", "volume", "up"])
        .assert()
        .failure()
        .stderr(contains("failed to send trigger"));
}

#[test]
fn daemon_round_trip() {
    let workspace = Workspace::new();
    let mut daemon = workspace.spawn_daemon();
    let socket = workspace.socket();
    assert!(
        wait_until(|| Path::new(&socket).exists()),
        "daemon should bind its socket"
    );

    workspace
        .osdman()
        .args(["call", "volume", "up"])
        .assert()
        .success()
        .stdout("Wrote: 9\n");
    assert!(
        wait_until(|| workspace.display_output() == "55\n"),
        "display received {:?}",
        workspace.display_output()
    );

    terminate(&mut daemon);
    let status = daemon.wait().expect("wait for daemon");
    assert!(status.success(), "daemon exited with {status}");
    assert!(!socket.exists(), "socket should be removed on shutdown");
}
