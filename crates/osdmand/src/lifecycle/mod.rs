//! Daemon lifecycle: initialisation, concurrent activities, and shutdown.
//!
//! [`Daemon::initialise`] binds the trigger socket, opens the display pipe,
//! and starts the display program. [`Daemon::run`] then drives three threads:
//! the signal watcher, the trigger listener, and the display supervisor. Shutdown is requested by a signal, by
//! [`DaemonCloser::close`], or by both activities finishing. Whichever comes
//! first cancels the shared [`CancellationToken`] and runs the cleanup actions;
//! later requests wait for that cleanup and then return.

mod cancel;
mod cleanup;
mod errors;

use std::fmt;
use std::fs;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use osdman_config::{Config, SocketPath};
use tracing::{debug, info};

use self::cleanup::CleanupActions;
use crate::dispatch::Dispatcher;
use crate::display::{DisplayExit, DisplayPipe, DisplaySupervisor, RunningDisplay};
use crate::health::HealthReporter;
use crate::process::ShutdownSignal;
use crate::runner::CommandRunner;
use crate::transport::{ListenerHandle, TriggerListener};

pub use self::cancel::CancellationToken;
pub use self::errors::LifecycleError;

pub(crate) const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");

/// Linear lifecycle of the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Resources are being acquired.
    Initializing,
    /// The listener and display supervisor are running.
    Running,
    /// Cleanup actions are running.
    ShuttingDown,
    /// Every activity has finished.
    Stopped,
}

impl LifecycleState {
    /// Stable lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::ShuttingDown => "shutting_down",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused shutdown to begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// A termination signal arrived.
    Signal(i32),
    /// [`DaemonCloser::close`] was called.
    Close,
    /// Both activities finished on their own.
    ActivitiesFinished,
    /// An activity could not be started.
    StartupFailure,
    /// The daemon was dropped without running.
    Discarded,
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(signal) => write!(f, "signal {signal}"),
            Self::Close => f.write_str("explicit close"),
            Self::ActivitiesFinished => f.write_str("activities finished"),
            Self::StartupFailure => f.write_str("startup failure"),
            Self::Discarded => f.write_str("daemon discarded"),
        }
    }
}

/// Collaborators supplied by the launcher.
#[derive(Clone)]
pub struct DaemonServices {
    /// Source of termination signals.
    pub signal: Arc<dyn ShutdownSignal>,
    /// Observer for lifecycle events.
    pub reporter: Arc<dyn HealthReporter>,
}

struct Shared {
    state: Mutex<LifecycleState>,
    token: CancellationToken,
    cleanup: CleanupActions,
    reporter: Arc<dyn HealthReporter>,
}

impl Shared {
    fn new(reporter: Arc<dyn HealthReporter>) -> Self {
        Self {
            state: Mutex::new(LifecycleState::Initializing),
            token: CancellationToken::new(),
            cleanup: CleanupActions::default(),
            reporter,
        }
    }

    fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves forward to `next`; the state never moves backwards.
    fn transition(&self, next: LifecycleState) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state >= next {
                return;
            }
            *state = next;
        }
        self.reporter.lifecycle_changed(next);
    }

    /// Returns `true` for the caller whose request ran the cleanup.
    fn shutdown(&self, trigger: ShutdownTrigger) -> bool {
        self.cleanup.run_once(|| {
            self.token.cancel();
            self.reporter.shutdown_requested(trigger);
            self.transition(LifecycleState::ShuttingDown);
        })
    }
}

/// Handle that requests shutdown from outside the daemon's threads.
#[derive(Clone)]
pub struct DaemonCloser {
    shared: Arc<Shared>,
}

impl DaemonCloser {
    /// Requests shutdown and waits until cleanup has run.
    ///
    /// Safe to call any number of times from any thread.
    pub fn close(&self) {
        if !self.shared.shutdown(ShutdownTrigger::Close) {
            debug!(target: LIFECYCLE_TARGET, "shutdown already performed");
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }
}

/// The daemon: trigger socket, display pipe, display program, and cleanup
/// actions.
///
/// Dropping a daemon that never ran performs the same cleanup as a shutdown.
pub struct Daemon<R> {
    shared: Arc<Shared>,
    socket: SocketPath,
    parts: Option<Parts<R>>,
}

struct Parts<R> {
    config: Arc<Config>,
    runner: R,
    listener: TriggerListener,
    pipe: Arc<DisplayPipe>,
    display: Option<RunningDisplay>,
    signal: Arc<dyn ShutdownSignal>,
}

impl<R> Daemon<R>
where
    R: CommandRunner + 'static,
{
    /// Binds the trigger socket, opens the display pipe, and starts the
    /// display program on its read end.
    ///
    /// Closing the socket, removing its path, and closing the pipe are
    /// registered as cleanup actions in that order. A display program that
    /// cannot be started is reported and the daemon carries on without it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when the socket or the pipe cannot be set
    /// up. Nothing is left on disk in that case.
    pub fn initialise(
        config: Arc<Config>,
        runner: R,
        services: DaemonServices,
    ) -> Result<Self, LifecycleError> {
        let shared = Arc::new(Shared::new(services.reporter));
        shared
            .reporter
            .lifecycle_changed(LifecycleState::Initializing);

        let listener = TriggerListener::bind(config.daemon_socket())?;
        let closer = match listener.closer() {
            Ok(closer) => closer,
            Err(error) => {
                drop(listener);
                discard_socket_file(config.daemon_socket());
                return Err(error.into());
            }
        };
        let pipe = match DisplayPipe::open() {
            Ok(pipe) => Arc::new(pipe),
            Err(error) => {
                closer.close();
                return Err(error.into());
            }
        };

        shared.cleanup.register("close trigger socket", move || closer.close());
        let cleanup_pipe = Arc::clone(&pipe);
        shared
            .cleanup
            .register("close display pipe", move || cleanup_pipe.close());

        let supervisor = DisplaySupervisor::new(config.shell(), config.display_command());
        let display = match pipe
            .take_reader()
            .and_then(|reader| supervisor.launch(reader))
        {
            Ok(display) => Some(display),
            Err(error) => {
                shared.reporter.display_unavailable(&error);
                None
            }
        };

        Ok(Self {
            shared,
            socket: listener.path().clone(),
            parts: Some(Parts {
                config,
                runner,
                listener,
                pipe,
                display,
                signal: services.signal,
            }),
        })
    }

    /// Registers an extra action to run once during shutdown, after the
    /// built-in actions.
    pub fn on_shutdown(&mut self, name: &'static str, action: impl FnOnce() + Send + 'static) {
        self.shared.cleanup.register(name, action);
    }

    /// Returns a handle that can request shutdown from another thread.
    #[must_use]
    pub fn closer(&self) -> DaemonCloser {
        DaemonCloser {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.shared.state()
    }

    /// Path of the bound trigger socket.
    #[must_use]
    pub fn socket_path(&self) -> &SocketPath {
        &self.socket
    }

    /// Runs until shutdown, returning once every activity has finished.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when an activity could not be started or
    /// panicked. Cleanup has run and the state is `Stopped` either way.
    pub fn run(mut self) -> Result<(), LifecycleError> {
        let Some(parts) = self.parts.take() else {
            return Ok(());
        };
        let Parts {
            config,
            runner,
            listener,
            pipe,
            display,
            signal,
        } = parts;
        let shared = Arc::clone(&self.shared);
        shared.transition(LifecycleState::Running);
        info!(
            target: LIFECYCLE_TARGET,
            socket = %listener.path(),
            "daemon running"
        );

        let watcher = match spawn_signal_watcher(&signal, &shared) {
            Ok(watcher) => watcher,
            Err(error) => {
                shared.shutdown(ShutdownTrigger::StartupFailure);
                if let Some(display) = display {
                    stop_display(display, &shared);
                }
                shared.transition(LifecycleState::Stopped);
                return Err(error);
            }
        };

        let outcome = run_activities(&config, runner, listener, &pipe, display, &shared);

        shared.shutdown(ShutdownTrigger::ActivitiesFinished);
        signal.release();
        let watcher_outcome = watcher.join().map_err(|_| LifecycleError::ThreadPanic {
            activity: "signal watcher",
        });
        shared.transition(LifecycleState::Stopped);
        outcome.and(watcher_outcome)
    }
}

impl<R> Drop for Daemon<R> {
    fn drop(&mut self) {
        let Some(parts) = self.parts.take() else {
            return;
        };
        debug!(target: LIFECYCLE_TARGET, "daemon dropped before running");
        self.shared.shutdown(ShutdownTrigger::Discarded);
        if let Some(display) = parts.display {
            stop_display(display, &self.shared);
        }
        self.shared.transition(LifecycleState::Stopped);
    }
}

fn run_activities<R>(
    config: &Arc<Config>,
    runner: R,
    listener: TriggerListener,
    pipe: &Arc<DisplayPipe>,
    display: Option<RunningDisplay>,
    shared: &Arc<Shared>,
) -> Result<(), LifecycleError>
where
    R: CommandRunner + 'static,
{
    let dispatcher = Dispatcher::new(Arc::clone(config), runner, Arc::clone(pipe));
    let listener_handle = match listener.start(dispatcher, shared.token.clone()) {
        Ok(handle) => handle,
        Err(error) => {
            shared.shutdown(ShutdownTrigger::StartupFailure);
            if let Some(display) = display {
                stop_display(display, shared);
            }
            return Err(error.into());
        }
    };
    let Some(display) = display else {
        return join_listener(listener_handle);
    };
    let supervisor = match spawn_display_supervisor(display, shared) {
        Ok(supervisor) => supervisor,
        Err(error) => {
            shared.shutdown(ShutdownTrigger::StartupFailure);
            let _ = join_listener(listener_handle);
            return Err(error);
        }
    };

    let listener_outcome = join_listener(listener_handle);
    let display_outcome = supervisor.join().map_err(|_| LifecycleError::ThreadPanic {
        activity: "display supervisor",
    });
    listener_outcome.and(display_outcome)
}

fn join_listener(handle: ListenerHandle) -> Result<(), LifecycleError> {
    handle.join().map_err(LifecycleError::from)
}

fn spawn_signal_watcher(
    signal: &Arc<dyn ShutdownSignal>,
    shared: &Arc<Shared>,
) -> Result<JoinHandle<()>, LifecycleError> {
    let signal = Arc::clone(signal);
    let shared = Arc::clone(shared);
    thread::Builder::new()
        .name("signal-watcher".into())
        .spawn(move || {
            if let Some(received) = signal.wait() {
                shared.shutdown(ShutdownTrigger::Signal(received));
            }
        })
        .map_err(|source| LifecycleError::Spawn {
            activity: "signal watcher",
            source,
        })
}

/// Supervises `display` on its own thread until it exits or the token fires.
fn spawn_display_supervisor(
    display: RunningDisplay,
    shared: &Arc<Shared>,
) -> Result<JoinHandle<()>, LifecycleError> {
    let worker = Arc::clone(shared);
    let spawned = thread::Builder::new()
        .name("display-supervisor".into())
        .spawn(move || match display.supervise(&worker.token) {
            Ok(exit) => worker.reporter.display_exited(exit),
            Err(error) => worker.reporter.display_unavailable(&error),
        });
    spawned.map_err(|source| LifecycleError::Spawn {
        activity: "display supervisor",
        source,
    })
}

fn stop_display(display: RunningDisplay, shared: &Shared) {
    match display.terminate() {
        Ok(()) => shared.reporter.display_exited(DisplayExit::Cancelled),
        Err(error) => shared.reporter.display_unavailable(&error),
    }
}

fn discard_socket_file(path: &SocketPath) {
    if let Err(error) = fs::remove_file(path) {
        debug!(target: LIFECYCLE_TARGET, %error, "socket file not removed");
    }
}
