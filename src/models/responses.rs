//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing JSON response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStats;

/// Per-group entry of the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (cache_hits / gets)
    pub hit_rate: f64,
}

impl From<CacheStats> for GroupStatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsResponse {
    /// Stats of every registered group, keyed by group name
    pub groups: BTreeMap<String, GroupStatsResponse>,
}

impl StatsResponse {
    pub fn insert(&mut self, name: impl Into<String>, stats: CacheStats) {
        self.groups.insert(name.into(), stats.into());
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_flattens_group_stats() {
        let mut resp = StatsResponse::default();
        resp.insert(
            "scores",
            CacheStats {
                gets: 4,
                cache_hits: 3,
                ..CacheStats::default()
            },
        );

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["groups"]["scores"]["gets"], 4);
        assert_eq!(json["groups"]["scores"]["cache_hits"], 3);
        assert_eq!(json["groups"]["scores"]["hit_rate"], 0.75);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
