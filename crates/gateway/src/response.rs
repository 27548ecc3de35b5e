//! Outbound run response.

use std::collections::BTreeMap;

use serde::Serialize;

use websteer_agents::Trajectory;

/// Final answer for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomationResponse {
    pub session: String,
    pub success: bool,
    /// Engine-measured run duration, in seconds.
    pub duration: f64,
    pub result: Option<String>,
    /// Filename to retrieval reference: a presigned URL, or a local path
    /// when storage is disabled.
    pub downloads: BTreeMap<String, String>,
}

/// Assembles the response from already-computed parts. Pure; calling it
/// twice with the same inputs yields the same response.
pub fn build(
    session_id: &str,
    trajectory: &Trajectory,
    downloads: BTreeMap<String, String>,
) -> AutomationResponse {
    AutomationResponse {
        session: session_id.to_string(),
        success: trajectory.success,
        duration: trajectory.duration_secs,
        result: trajectory.final_result().map(str::to_string),
        downloads,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory() -> Trajectory {
        Trajectory {
            duration_secs: 12.5,
            result: Some("the invoice is downloaded".into()),
            errors: vec![],
            success: true,
            steps: 18,
        }
    }

    #[test]
    fn carries_trajectory_outcome_and_downloads() {
        let downloads =
            BTreeMap::from([("a.pdf".to_string(), "https://signed.example/a.pdf".to_string())]);
        let response = build("sess-1", &trajectory(), downloads.clone());
        assert_eq!(response.session, "sess-1");
        assert!(response.success);
        assert_eq!(response.duration, 12.5);
        assert_eq!(response.result.as_deref(), Some("the invoice is downloaded"));
        assert_eq!(response.downloads, downloads);
    }

    #[test]
    fn building_twice_yields_identical_responses() {
        let downloads = BTreeMap::from([("a.pdf".to_string(), "/tmp/downloads/a.pdf".to_string())]);
        let first = build("sess-2", &trajectory(), downloads.clone());
        let second = build("sess-2", &trajectory(), downloads);
        assert_eq!(first, second);
    }
}
