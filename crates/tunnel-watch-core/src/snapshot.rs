//! Timestamped verdicts handed to presentation surfaces.

use crate::client::{TflClient, TflError};
use crate::model::{Id, TunnelState, TunnelStatus};
use crate::service::{DisruptionSource, TunnelStatusService};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Milliseconds since UNIX epoch.
pub type EpochMs = i64;

pub fn now_ms() -> EpochMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Source of "now" for snapshots.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> EpochMs;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> EpochMs {
        now_ms()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub EpochMs);

impl Clock for FixedClock {
    fn now_ms(&self) -> EpochMs {
        self.0
    }
}

/// A verdict plus the instant it was captured.
///
/// Keys serialize in alphabetical order, `updatedAt` in epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TunnelStatusSnapshot {
    #[serde(default)]
    pub disruption_ids: Vec<Id>,
    #[serde(default)]
    pub severity: String,
    pub severity_description: String,
    pub state: TunnelState,
    pub tunnel_name: String,
    pub updated_at: EpochMs,
}

impl TunnelStatusSnapshot {
    pub fn from_status(status: TunnelStatus, updated_at: EpochMs) -> Self {
        Self {
            disruption_ids: status.disruption_ids,
            severity: status.severity,
            severity_description: status.severity_description,
            state: status.state,
            tunnel_name: status.tunnel_name,
            updated_at,
        }
    }

    /// Placeholder shown when no verdict could be computed.
    pub fn unknown(
        tunnel_name: impl Into<String>,
        description: impl Into<String>,
        updated_at: EpochMs,
    ) -> Self {
        snapshot(tunnel_name, TunnelState::Unknown, description, updated_at)
    }
}

/// Build a snapshot from its display fields alone. Severity is left empty
/// and no disruption ids are attached.
pub fn snapshot(
    tunnel_name: impl Into<String>,
    state: TunnelState,
    severity_description: impl Into<String>,
    updated_at: EpochMs,
) -> TunnelStatusSnapshot {
    TunnelStatusSnapshot {
        disruption_ids: Vec::new(),
        severity: String::new(),
        severity_description: severity_description.into(),
        state,
        tunnel_name: tunnel_name.into(),
        updated_at,
    }
}

/// Fetches a verdict and stamps it with the injected clock.
#[derive(Debug, Clone)]
pub struct SnapshotFetcher<S = TflClient, C = SystemClock> {
    service: TunnelStatusService<S>,
    clock: C,
}

impl<S: DisruptionSource, C: Clock> SnapshotFetcher<S, C> {
    pub fn new(service: TunnelStatusService<S>, clock: C) -> Self {
        Self { service, clock }
    }

    pub async fn fetch_snapshot(
        &self,
        tunnel_name: &str,
    ) -> Result<TunnelStatusSnapshot, TflError> {
        let status = self.service.fetch_tunnel_status(tunnel_name).await?;
        Ok(TunnelStatusSnapshot::from_status(status, self.clock.now_ms()))
    }

    /// Like [`Self::fetch_snapshot`] but never fails: an error becomes an
    /// `unknown` snapshot carrying the error text.
    pub async fn fetch_snapshot_or_unknown(&self, tunnel_name: &str) -> TunnelStatusSnapshot {
        match self.fetch_snapshot(tunnel_name).await {
            Ok(snap) => snap,
            Err(e) => {
                warn!(tunnel = tunnel_name, error = %e, "status fetch failed");
                TunnelStatusSnapshot::unknown(tunnel_name, e.to_string(), self.clock.now_ms())
            }
        }
    }
}
