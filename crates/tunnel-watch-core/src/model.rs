use serde::{Deserialize, Serialize};

/// Identifier of a TfL road or disruption record.
pub type Id = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TunnelState {
    Open,
    Closed,
    Unknown,
}

impl TunnelState {
    /// Upper-case label used by every text surface (`OPEN`, `CLOSED`, `UNKNOWN`).
    pub fn label(self) -> &'static str {
        match self {
            TunnelState::Open => "OPEN",
            TunnelState::Closed => "CLOSED",
            TunnelState::Unknown => "UNKNOWN",
        }
    }

    /// Process exit code reported by the CLI for this state.
    pub fn exit_code(self) -> u8 {
        match self {
            TunnelState::Open => 0,
            TunnelState::Closed => 1,
            TunnelState::Unknown => 3,
        }
    }
}

impl std::fmt::Display for TunnelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The authority's own per-road status row (`GET /Road/{ids}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoadStatus {
    pub id: Id,
    pub display_name: String,
    /// Free-text label, e.g. "Good" or "Closure".
    pub status_severity: String,
    pub status_severity_description: String,
}

/// A street segment affected by a disruption.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Street {
    pub name: String,
    /// "Open", "Closed", "Partial closure" ... compared case-insensitively.
    pub closure: String,
    pub directions: String,
}

/// One entry of `GET /Road/all/Disruption`, normalized.
///
/// Optional upstream fields have already been defaulted: missing strings
/// are empty, a missing `hasClosures` is `false` and missing `streets` is
/// an empty list. `severity` stays optional because an empty label is
/// reported verbatim while a missing one is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoadDisruption {
    pub id: Id,
    pub severity: Option<String>,
    pub status: String,
    pub category: String,
    pub sub_category: String,
    pub location: String,
    pub comments: String,
    pub has_closures: bool,
    pub streets: Vec<Street>,
}

/// Verdict for one tunnel, computed fresh on every query.
///
/// Fields are declared in alphabetical key order so the JSON output is
/// stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TunnelStatus {
    /// Ids of every matched disruption, in feed order.
    pub disruption_ids: Vec<Id>,
    pub severity: String,
    pub severity_description: String,
    pub state: TunnelState,
    pub tunnel_name: String,
}

/// Optional-aware mirrors of the upstream JSON.
///
/// The feed does not guarantee any field beyond `id`, so decoding happens
/// here and the result is immediately converted into the normalized
/// records above.
pub mod wire {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RoadStatus {
        pub id: String,
        pub display_name: Option<String>,
        pub status_severity: Option<String>,
        pub status_severity_description: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Street {
        pub name: Option<String>,
        pub closure: Option<String>,
        pub directions: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RoadDisruption {
        pub id: String,
        pub severity: Option<String>,
        pub status: Option<String>,
        pub category: Option<String>,
        pub sub_category: Option<String>,
        pub location: Option<String>,
        pub comments: Option<String>,
        pub has_closures: Option<bool>,
        pub streets: Option<Vec<Street>>,
    }
}

impl From<wire::RoadStatus> for RoadStatus {
    fn from(w: wire::RoadStatus) -> Self {
        Self {
            id: w.id,
            display_name: w.display_name.unwrap_or_default(),
            status_severity: w.status_severity.unwrap_or_default(),
            status_severity_description: w.status_severity_description.unwrap_or_default(),
        }
    }
}

impl From<wire::Street> for Street {
    fn from(w: wire::Street) -> Self {
        Self {
            name: w.name.unwrap_or_default(),
            closure: w.closure.unwrap_or_default(),
            directions: w.directions.unwrap_or_default(),
        }
    }
}

impl From<wire::RoadDisruption> for RoadDisruption {
    fn from(w: wire::RoadDisruption) -> Self {
        Self {
            id: w.id,
            severity: w.severity,
            status: w.status.unwrap_or_default(),
            category: w.category.unwrap_or_default(),
            sub_category: w.sub_category.unwrap_or_default(),
            location: w.location.unwrap_or_default(),
            comments: w.comments.unwrap_or_default(),
            has_closures: w.has_closures.unwrap_or(false),
            streets: w
                .streets
                .unwrap_or_default()
                .into_iter()
                .map(Street::from)
                .collect(),
        }
    }
}

/// Decode a `GET /Road/all/Disruption` body into normalized records.
pub fn decode_disruptions(body: &str) -> serde_json::Result<Vec<RoadDisruption>> {
    let raw: Vec<wire::RoadDisruption> = serde_json::from_str(body)?;
    Ok(raw.into_iter().map(RoadDisruption::from).collect())
}

/// Decode a `GET /Road/{ids}` body into normalized records.
pub fn decode_road_statuses(body: &str) -> serde_json::Result<Vec<RoadStatus>> {
    let raw: Vec<wire::RoadStatus> = serde_json::from_str(body)?;
    Ok(raw.into_iter().map(RoadStatus::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disruption_nulls_become_defaults() {
        let body = r#"[
            { "id": "TIMS-1", "severity": null, "hasClosures": null, "streets": null },
            { "id": "TIMS-2" }
        ]"#;
        let decoded = decode_disruptions(body).unwrap();
        assert_eq!(decoded.len(), 2);
        for d in &decoded {
            assert_eq!(d.severity, None);
            assert_eq!(d.comments, "");
            assert!(!d.has_closures);
            assert!(d.streets.is_empty());
        }
        assert_eq!(decoded[1].id, "TIMS-2");
    }

    #[test]
    fn disruption_decodes_camel_case_fields() {
        let body = r#"[{
            "id": "TIMS-123",
            "severity": "Severe",
            "status": "Active",
            "category": "Works",
            "subCategory": "Planned",
            "location": "[A101] ROTHERHITHE TUNNEL",
            "comments": "Rotherhithe Tunnel closed",
            "hasClosures": true,
            "streets": [
                { "name": "[A101] ROTHERHITHE TUNNEL", "closure": "Closed", "directions": "Both directions" }
            ]
        }]"#;
        let d = &decode_disruptions(body).unwrap()[0];
        assert_eq!(d.severity.as_deref(), Some("Severe"));
        assert_eq!(d.sub_category, "Planned");
        assert!(d.has_closures);
        assert_eq!(d.streets[0].closure, "Closed");
        assert_eq!(d.streets[0].directions, "Both directions");
    }

    #[test]
    fn disruption_without_id_is_rejected() {
        assert!(decode_disruptions(r#"[{ "severity": "Severe" }]"#).is_err());
        assert!(decode_disruptions(r#"{ "id": "not-a-list" }"#).is_err());
    }

    #[test]
    fn road_status_decodes() {
        let body = r#"[{
            "id": "rotherhithe-tunnel",
            "displayName": "Rotherhithe Tunnel",
            "statusSeverity": "Closure",
            "statusSeverityDescription": "Road Closed"
        }]"#;
        let s = &decode_road_statuses(body).unwrap()[0];
        assert_eq!(s.display_name, "Rotherhithe Tunnel");
        assert_eq!(s.status_severity, "Closure");
    }

    #[test]
    fn tunnel_state_serde() {
        let serialized = serde_json::to_string(&TunnelState::Closed).unwrap();
        assert_eq!(serialized, r#""closed""#);
        let deserialized: TunnelState = serde_json::from_str(r#""unknown""#).unwrap();
        assert_eq!(deserialized, TunnelState::Unknown);
    }

    #[test]
    fn tunnel_state_exit_codes() {
        assert_eq!(TunnelState::Open.exit_code(), 0);
        assert_eq!(TunnelState::Closed.exit_code(), 1);
        assert_eq!(TunnelState::Unknown.exit_code(), 3);
        assert_eq!(TunnelState::Closed.to_string(), "CLOSED");
    }

    #[test]
    fn tunnel_status_keys_are_sorted() {
        let status = TunnelStatus {
            disruption_ids: vec![],
            severity: "None".into(),
            severity_description: "No active disruptions".into(),
            state: TunnelState::Open,
            tunnel_name: "Rotherhithe Tunnel".into(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(
            json,
            r#"{"disruptionIds":[],"severity":"None","severityDescription":"No active disruptions","state":"open","tunnelName":"Rotherhithe Tunnel"}"#
        );
    }
}
