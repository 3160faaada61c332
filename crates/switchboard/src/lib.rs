//! Switchboard - stream liveness and failover engine
//!
//! Switchboard fronts collections of candidate stream endpoints grouped by
//! logical channel and exposes, at any moment, one believed-working
//! endpoint per group.
//!
//! # Architecture
//!
//! - **Engine**: single-flight full verification passes over a group
//!   store, a TTL'd selection cache, and the failover primitive
//! - **ChannelMonitor**: slow periodic sweep of only the currently
//!   selected candidate per group
//! - **ApiServer**: thin HTTP surface exposing the selection, the
//!   failover trigger, reload, and metrics
//!
//! Probing itself lives in the `liveness` crate and runs through a small
//! bounded pool so request serving never pays full probe latency: readers
//! are answered from the cache, optimistically populated on every reload
//! and refreshed by complete passes.

pub mod cache;
pub mod channels;
pub mod config;
pub mod engine;
pub mod http_server;
pub mod metrics;
pub mod monitor;
pub mod server;
pub mod store;
pub mod types;

pub use config::{Config, ConfigError};
pub use engine::Engine;
pub use http_server::{ApiServer, AppState};
pub use metrics::MetricsRegistry;
pub use monitor::ChannelMonitor;
pub use server::SwitchboardServer;
pub use types::{ActiveStreams, Candidate, ChannelGroups, EngineSettings};
