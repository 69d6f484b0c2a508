//! Test suites for the relay daemon.

mod relay_behaviour;
mod support;
