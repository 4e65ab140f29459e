//! # TestFlow client
//!
//! Async Rust client for the TestFlow test-design service.
//!
//! This library provides:
//! - A shared HTTP transport with an ordered middleware chain, bearer-token
//!   injection and normalized, display-ready errors
//! - Typed views over the REST resources (projects, modules, requirements,
//!   test data, settings, AI models, agents, system)
//! - Submit / status / cancel primitives for server-side async AI tasks, and
//!   a cancellable poller that drives them to completion
//!
//! ## Architecture
//!
//! ```text
//!   TestFlowClient ──► resource views (borrow) ──┐
//!        │                                       ▼
//!        ├──► AsyncTaskClient ──────────────► Transport ──► middleware chain ──► reqwest
//!        │         ▲                             │
//!        └──► Poller (TaskStatusSource)          └──► Session (shared bearer credential)
//! ```
//!
//! ## Modules
//! - `config`: environment-driven client configuration
//! - `session`: shared credential handle
//! - `http`: transport, middleware and error normalization
//! - `task`: async task model, client and poller
//! - `api`: resource clients and the `TestFlowClient` facade

pub mod api;
pub mod config;
pub mod http;
pub mod session;
pub mod task;

#[cfg(test)]
mod test_support;

pub use api::TestFlowClient;
pub use config::{ClientConfig, ConfigError};
pub use http::{ApiError, ApiErrorKind, RequestOptions, Transport};
pub use session::Session;
pub use task::{AsyncTaskClient, Poller, PollerConfig, TaskError, TaskSnapshot, TaskStatus, TaskType};
