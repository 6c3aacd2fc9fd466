//! Pure classification over decoded records.
//!
//! Two independent paths produce a verdict: [`classify`] reads one of the
//! authority's own road status rows, while [`resolve`] scans the disruption
//! feed using [`matches`] and [`is_closed`]. Neither can fail.

use crate::model::{RoadDisruption, RoadStatus, TunnelState, TunnelStatus};

pub const NO_DISRUPTION_SEVERITY: &str = "None";
pub const NO_DISRUPTION_DESCRIPTION: &str = "No active disruptions";
pub const UNKNOWN_SEVERITY: &str = "Unknown";
pub const FALLBACK_DESCRIPTION: &str = "Active disruption";

/// Case-insensitive substring match of `query` against the disruption's
/// location and comments. A blank query never matches.
pub fn matches(disruption: &RoadDisruption, query: &str) -> bool {
    let q = query.trim();
    if q.is_empty() {
        return false;
    }

    let haystack = [disruption.location.as_str(), disruption.comments.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    haystack.contains(&q.to_lowercase())
}

/// A disruption closes the road when it says so outright, or when any of
/// its street segments is marked "closed".
pub fn is_closed(disruption: &RoadDisruption) -> bool {
    disruption.has_closures
        || disruption
            .streets
            .iter()
            .any(|s| s.closure.to_lowercase() == "closed")
}

/// Classify a single road status row.
pub fn classify(status: &RoadStatus) -> TunnelState {
    let sev = status.status_severity.trim().to_lowercase();
    let desc = status.status_severity_description.trim().to_lowercase();

    if sev.contains("closed") || sev.contains("closure") || desc.contains("closed") {
        return TunnelState::Closed;
    }
    if sev.is_empty() && desc.is_empty() {
        return TunnelState::Unknown;
    }
    TunnelState::Open
}

/// Resolve a verdict for `tunnel_name` from the full disruption feed.
///
/// No match means the tunnel is presumed open. Otherwise the first closed
/// match (or the first match, when none is closed) supplies the severity
/// and description, and every match contributes its id.
pub fn resolve(tunnel_name: &str, disruptions: &[RoadDisruption]) -> TunnelStatus {
    let matched: Vec<&RoadDisruption> = disruptions
        .iter()
        .filter(|d| matches(d, tunnel_name))
        .collect();

    let Some(first) = matched.first() else {
        return TunnelStatus {
            disruption_ids: Vec::new(),
            severity: NO_DISRUPTION_SEVERITY.to_string(),
            severity_description: NO_DISRUPTION_DESCRIPTION.to_string(),
            state: TunnelState::Open,
            tunnel_name: tunnel_name.to_string(),
        };
    };

    let closed_match = matched.iter().find(|d| is_closed(d));
    let (primary, state) = match closed_match {
        Some(d) => (*d, TunnelState::Closed),
        None => (*first, TunnelState::Open),
    };

    TunnelStatus {
        disruption_ids: matched.iter().map(|d| d.id.clone()).collect(),
        severity: primary
            .severity
            .clone()
            .unwrap_or_else(|| UNKNOWN_SEVERITY.to_string()),
        severity_description: first_non_empty(
            &[primary.comments.as_str(), primary.location.as_str()],
            FALLBACK_DESCRIPTION,
        ),
        state,
        tunnel_name: tunnel_name.to_string(),
    }
}

fn first_non_empty(candidates: &[&str], fallback: &str) -> String {
    candidates
        .iter()
        .find(|c| !c.is_empty())
        .copied()
        .unwrap_or(fallback)
        .to_string()
}
