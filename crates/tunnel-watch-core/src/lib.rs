#![forbid(unsafe_code)]

//! Tunnel status resolution over the TfL road disruption feed.
//!
//! Data flows one way: [`client::TflClient`] fetches raw records,
//! [`classify`] turns them into a [`model::TunnelStatus`] verdict and
//! [`snapshot`] stamps the verdict with the instant it was computed.

pub mod classify;
pub mod client;
pub mod model;
pub mod service;
pub mod snapshot;

pub use classify::{classify, is_closed, matches, resolve};
pub use client::{ClientConfig, TflClient, TflError, DEFAULT_BASE_URL};
pub use model::*;
pub use service::{DisruptionSource, TunnelStatusService, DEFAULT_TUNNEL_NAME};
pub use snapshot::{
    now_ms, snapshot, Clock, EpochMs, FixedClock, SnapshotFetcher, SystemClock,
    TunnelStatusSnapshot,
};
