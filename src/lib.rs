// The binary entry point is main.rs; the library target carries the module
// tree so integration tests and criterion benches can drive the engine and
// the cycle loop without a terminal.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod logging;
pub mod session;
pub mod store;
pub mod ui;
