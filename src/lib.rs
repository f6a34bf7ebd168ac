// The binary entry point is main.rs; the module tree lives here so the
// integration tests and benchmarks can drive it through `quizdesk::*`.

pub mod app;
pub mod catalog;
pub mod config;
pub mod roster;
pub mod screens;
pub mod session;
pub mod store;
pub mod ui;
