//! Purpose: Library crate shared by the `agent-explorer` CLI and its tests.
//! Exports: `core` (values, errors), `render`, `session`, `api` (ask client),
//! `agent` (fact-checking backend), `server`, `batch`.
//! Role: Client side renders structured answers; backend side produces them.
//! Invariants: Rendering and session transitions are pure and never fail.
//! Invariants: All network I/O goes through `api::AskClient` or `agent::providers`.
pub mod agent;
pub mod api;
pub mod batch;
pub mod core;
pub mod render;
pub mod server;
pub mod session;
