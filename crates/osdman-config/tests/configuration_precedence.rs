//! Precedence between the explicit path, the environment override, and the
//! default configuration location.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use osdman_config::{CONFIG_PATH_ENV_VAR, Config};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct Harness {
    temp_dir: TempDir,
    previous: Option<OsString>,
    _guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            previous: std::env::var_os(CONFIG_PATH_ENV_VAR),
            _guard: guard,
        }
    }

    fn write_config(&self, name: &str, stat_cmd: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let yaml = format!(
            "domains:\n  volume:\n    stat_cmd: \"{stat_cmd}\"\n    verbs:\n      up:\n        cmd: \"true\"\n"
        );
        if let Err(error) = fs::write(&path, yaml) {
            panic!("failed to write configuration: {error}");
        }
        path
    }

    fn set_env(&self, value: &Path) {
        // Environment mutation is `unsafe` under edition 2024; the harness
        // holds ENV_MUTEX and restores the previous value on drop.
        unsafe { std::env::set_var(CONFIG_PATH_ENV_VAR, value) };
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(CONFIG_PATH_ENV_VAR, value) },
            None => unsafe { std::env::remove_var(CONFIG_PATH_ENV_VAR) },
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

fn stat_cmd(config: &Config) -> &str {
    match config.domain("volume") {
        Some(domain) => domain.measurement_command.as_str(),
        None => panic!("volume domain missing"),
    }
}

#[rstest]
fn environment_override_is_used_without_explicit_path(harness: Harness) {
    let env_path = harness.write_config("env.yaml", "echo env");
    harness.set_env(&env_path);

    let config = Config::load().expect("configuration should load");
    assert_eq!(stat_cmd(&config), "echo env");
}

#[rstest]
fn explicit_path_beats_environment(harness: Harness) {
    let env_path = harness.write_config("env.yaml", "echo env");
    let cli_path = harness.write_config("cli.yaml", "echo cli");
    harness.set_env(&env_path);

    let config =
        Config::load_with_override(Some(&cli_path)).expect("configuration should load");
    assert_eq!(stat_cmd(&config), "echo cli");
}

#[rstest]
fn missing_environment_target_is_reported(harness: Harness) {
    let missing = harness.temp_dir.path().join("absent.yaml");
    harness.set_env(&missing);

    let error = Config::load().expect_err("absent file should fail");
    assert!(error.is_not_found());
}
