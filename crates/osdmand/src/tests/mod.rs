//! Behaviour suites for the running daemon.

mod support;
