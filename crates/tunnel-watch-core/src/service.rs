use crate::classify::resolve;
use crate::client::{TflClient, TflError};
use crate::model::{RoadDisruption, TunnelStatus};
use std::future::Future;
use tracing::{debug, info};

pub const DEFAULT_TUNNEL_NAME: &str = "Rotherhithe Tunnel";

/// Anything that can produce the current disruption feed.
pub trait DisruptionSource: Send + Sync {
    fn fetch_road_disruptions(
        &self,
    ) -> impl Future<Output = Result<Vec<RoadDisruption>, TflError>> + Send;
}

impl DisruptionSource for TflClient {
    async fn fetch_road_disruptions(&self) -> Result<Vec<RoadDisruption>, TflError> {
        TflClient::fetch_road_disruptions(self).await
    }
}

/// Resolves a tunnel's state from the disruption feed.
///
/// Holds nothing mutable; each call fetches a fresh feed and builds a fresh
/// verdict. Fetch failures are returned as-is and never retried.
#[derive(Debug, Clone)]
pub struct TunnelStatusService<S = TflClient> {
    source: S,
}

impl<S: DisruptionSource> TunnelStatusService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn fetch_tunnel_status(
        &self,
        tunnel_name: &str,
    ) -> Result<TunnelStatus, TflError> {
        let disruptions = self.source.fetch_road_disruptions().await?;
        debug!(total = disruptions.len(), tunnel = tunnel_name, "scanning disruptions");

        let status = resolve(tunnel_name, &disruptions);
        info!(
            tunnel = %status.tunnel_name,
            state = %status.state,
            matched = status.disruption_ids.len(),
            "resolved tunnel status"
        );
        Ok(status)
    }
}
