use serde::{Deserialize, Serialize};

pub mod push_wire;

/// Headline numbers for the dashboard. Every field is optional: the backend
/// omits what it cannot compute and push updates carry only the fields that
/// changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub active_collectors: Option<u64>,
    pub total_contents: Option<u64>,
    pub cache_hit_ratio: Option<f64>,
    pub requests_per_hour: Option<u64>,
}

impl DashboardStats {
    /// Overwrite each field present in `patch`; absent fields keep their
    /// current value.
    pub fn merge(&mut self, patch: DashboardStats) {
        if patch.active_collectors.is_some() {
            self.active_collectors = patch.active_collectors;
        }
        if patch.total_contents.is_some() {
            self.total_contents = patch.total_contents;
        }
        if patch.cache_hit_ratio.is_some() {
            self.cache_hit_ratio = patch.cache_hit_ratio;
        }
        if patch.requests_per_hour.is_some() {
            self.requests_per_hour = patch.requests_per_hour;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorRecord {
    pub name: String,
    #[serde(default, rename = "type")]
    pub collector_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub last_run: Option<String>,
    #[serde(default)]
    pub next_run: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: i64,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Stats for the two backing caches. Either side is absent when that cache
/// is not configured on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheStats {
    pub caffeine: Option<CaffeineStats>,
    pub redis: Option<RedisStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaffeineStats {
    pub entries: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub evictions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedisStats {
    pub connected: bool,
    pub keys: u64,
    pub memory: String,
    pub hits: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub logger: String,
    pub message: String,
    pub exception: Option<String>,
}

/// Push payload announcing a collector status flip. Records themselves are
/// server-owned; only the status and message are merged into the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorUpdate {
    pub collector_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_record_maps_camel_case_fields() {
        let record: CollectorRecord = serde_json::from_str(
            r#"{
                "name": "google-news",
                "type": "news",
                "status": "RUNNING",
                "enabled": true,
                "lastRun": "2026-03-01T10:00:00",
                "nextRun": null
            }"#,
        )
        .expect("parse collector");
        assert_eq!(record.name, "google-news");
        assert_eq!(record.collector_type, "news");
        assert_eq!(record.status, "RUNNING");
        assert!(record.enabled);
        assert_eq!(record.last_run.as_deref(), Some("2026-03-01T10:00:00"));
        assert!(record.next_run.is_none());
        assert!(record.schedule.is_none());
    }

    #[test]
    fn dashboard_stats_tolerates_missing_fields() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"activeCollectors": 3}"#).expect("parse stats");
        assert_eq!(stats.active_collectors, Some(3));
        assert!(stats.total_contents.is_none());
        assert!(stats.cache_hit_ratio.is_none());
    }

    #[test]
    fn dashboard_stats_merge_keeps_absent_fields() {
        let mut stats = DashboardStats {
            active_collectors: Some(2),
            total_contents: Some(140),
            cache_hit_ratio: Some(0.92),
            requests_per_hour: None,
        };
        stats.merge(DashboardStats {
            active_collectors: Some(3),
            requests_per_hour: Some(120),
            ..DashboardStats::default()
        });
        assert_eq!(stats.active_collectors, Some(3));
        assert_eq!(stats.total_contents, Some(140));
        assert_eq!(stats.cache_hit_ratio, Some(0.92));
        assert_eq!(stats.requests_per_hour, Some(120));
    }

    #[test]
    fn cache_stats_sides_are_independently_optional() {
        let stats: CacheStats = serde_json::from_str(
            r#"{"caffeine": {"entries": 42, "hitRate": 0.9, "missRate": 0.1, "evictions": 7}}"#,
        )
        .expect("parse cache stats");
        let caffeine = stats.caffeine.expect("caffeine side");
        assert_eq!(caffeine.entries, 42);
        assert!((caffeine.hit_rate - 0.9).abs() < f64::EPSILON);
        assert!(stats.redis.is_none());
    }

    #[test]
    fn content_record_accepts_null_region() {
        let record: ContentRecord = serde_json::from_str(
            r#"{
                "id": 17,
                "contentType": "news",
                "countryCode": "FR",
                "regionCode": null,
                "status": "ACTIVE",
                "publishedAt": "2026-02-14T08:30:00"
            }"#,
        )
        .expect("parse content");
        assert_eq!(record.id, 17);
        assert_eq!(record.country_code, "FR");
        assert!(record.region_code.is_none());
        assert_eq!(record.published_at.as_deref(), Some("2026-02-14T08:30:00"));
    }
}
