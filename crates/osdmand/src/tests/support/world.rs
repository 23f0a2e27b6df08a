//! A daemon running on background threads inside a temporary directory.

use std::fs;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use osdman_config::{Config, Domain, SocketPath};
use tempfile::TempDir;

use super::{ManualShutdownSignal, RecordingHealthReporter};
use crate::lifecycle::{Daemon, DaemonCloser, DaemonServices, LifecycleError, LifecycleState};
use crate::runner::{CommandRunner, ShellCommandRunner};

const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Configuration serving `volume` (`echo 55`) and `brightness` (`echo 10`),
/// each with an `up` verb, with the socket and display output under `dir`.
pub(crate) fn daemon_config(dir: &Path) -> Config {
    let mut config = Config::default()
        .with_domain("volume", Domain::new("echo 55").with_verb("up", "true"))
        .with_domain("brightness", Domain::new("echo 10").with_verb("up", "true"));
    config.shell = "sh".into();
    config.display_command = format!("cat > '{}'", dir.join("display.out").display());
    config.daemon_socket = SocketPath::new(
        dir.join("osdcmd.sock")
            .to_str()
            .expect("utf8 socket path")
            .to_owned(),
    );
    config
}

pub(crate) struct DaemonWorld {
    _dir: TempDir,
    pub(crate) socket: PathBuf,
    pub(crate) display_file: PathBuf,
    pub(crate) signal: Arc<ManualShutdownSignal>,
    pub(crate) reporter: Arc<RecordingHealthReporter>,
    pub(crate) closer: DaemonCloser,
    cleanup_runs: Arc<AtomicUsize>,
    run: Option<JoinHandle<Result<(), LifecycleError>>>,
}

impl DaemonWorld {
    /// Starts a daemon serving `volume` (`echo 55`) and `brightness`
    /// (`echo 10`), each with an `up` verb, rendering into a file.
    pub(crate) fn start() -> Self {
        Self::start_with(|_| {}, ShellCommandRunner::new("sh"))
    }

    pub(crate) fn start_with<R>(customise: impl FnOnce(&mut Config), runner: R) -> Self
    where
        R: CommandRunner + 'static,
    {
        Self::start_prepared(customise, runner, |_| {})
    }

    /// Starts the default daemon after `prepare` has registered extra
    /// shutdown actions.
    pub(crate) fn start_prepared<R>(
        customise: impl FnOnce(&mut Config),
        runner: R,
        prepare: impl FnOnce(&mut Daemon<R>),
    ) -> Self
    where
        R: CommandRunner + 'static,
    {
        let dir = tempfile::tempdir().expect("temp dir");
        let socket = dir.path().join("osdcmd.sock");
        let display_file = dir.path().join("display.out");
        let mut config = daemon_config(dir.path());
        customise(&mut config);

        let signal = Arc::new(ManualShutdownSignal::default());
        let reporter = Arc::new(RecordingHealthReporter::default());
        let services = DaemonServices {
            signal: signal.clone(),
            reporter: reporter.clone(),
        };
        let mut daemon =
            Daemon::initialise(Arc::new(config), runner, services).expect("initialise daemon");
        prepare(&mut daemon);
        let cleanup_runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cleanup_runs);
        daemon.on_shutdown("count cleanup", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let closer = daemon.closer();
        let run = thread::spawn(move || daemon.run());

        let world = Self {
            _dir: dir,
            socket,
            display_file,
            signal,
            reporter,
            closer,
            cleanup_runs,
            run: Some(run),
        };
        assert!(
            world.wait_until(|| world.closer.state() == LifecycleState::Running),
            "daemon should reach Running"
        );
        world
    }

    pub(crate) fn send(&self, payload: &[u8]) {
        let client = UnixDatagram::unbound().expect("client socket");
        client.send_to(payload, &self.socket).expect("send trigger");
    }

    pub(crate) fn display_output(&self) -> String {
        fs::read_to_string(&self.display_file).unwrap_or_default()
    }

    pub(crate) fn wait_for_display(&self, expected: &str) -> bool {
        self.wait_until(|| self.display_output() == expected)
    }

    pub(crate) fn wait_until(&self, mut check: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + WAIT_LIMIT;
        while Instant::now() < deadline {
            if check() {
                return true;
            }
            thread::sleep(Duration::from_millis(20));
        }
        false
    }

    pub(crate) fn cleanup_runs(&self) -> usize {
        self.cleanup_runs.load(Ordering::SeqCst)
    }

    /// Waits for [`Daemon::run`] to return.
    pub(crate) fn join(&mut self) -> Result<(), LifecycleError> {
        self.run
            .take()
            .expect("daemon already joined")
            .join()
            .expect("daemon thread panicked")
    }
}

impl Drop for DaemonWorld {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            self.closer.close();
            let _ = run.join();
        }
    }
}
