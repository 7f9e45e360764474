use auc_api::{AdminApi, ApiError, UploadPayload};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn dashboard_stats_parses_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"activeCollectors":4,"totalContents":1312,"cacheHitRatio":87.5}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = AdminApi::new(&server.uri()).expect("client");
    let stats = api.dashboard_stats().await.expect("stats");
    assert_eq!(stats.active_collectors, Some(4));
    assert_eq!(stats.total_contents, Some(1312));
    assert_eq!(stats.cache_hit_ratio, Some(87.5));
    assert_eq!(stats.requests_per_hour, None);
}

#[tokio::test]
async fn collectors_list_round_trips() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/collectors"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[
                {"name":"google-news","type":"news","status":"RUNNING","enabled":true,
                 "lastRun":"2026-03-01T10:00:00","nextRun":"2026-03-01T11:00:00"},
                {"name":"weather","type":"weather","status":"IDLE","enabled":false}
            ]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = AdminApi::new(&server.uri()).expect("client");
    let collectors = api.collectors().await.expect("collectors");
    assert_eq!(collectors.len(), 2);
    assert_eq!(collectors[0].name, "google-news");
    assert_eq!(collectors[0].collector_type, "news");
    assert_eq!(collectors[1].status, "IDLE");
    assert!(!collectors[1].enabled);
    assert!(collectors[1].last_run.is_none());
}

#[tokio::test]
async fn empty_collector_list_is_an_empty_vec_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/collectors"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let api = AdminApi::new(&server.uri()).expect("client");
    assert!(api.collectors().await.expect("collectors").is_empty());
}

#[tokio::test]
async fn logs_request_carries_level_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/logs"))
        .and(query_param("level", "ERROR"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"timestamp":"2026-03-01T10:00:00","level":"ERROR","logger":"c.a.u.CacheService","message":"redis down"}]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = AdminApi::new(&server.uri()).expect("client");
    let logs = api.logs("ERROR", 100).await.expect("logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "redis down");
    assert!(logs[0].exception.is_none());
}

#[tokio::test]
async fn run_collector_posts_to_the_named_collector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/collectors/google-news/run"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = AdminApi::new(&server.uri()).expect("client");
    api.run_collector("google-news").await.expect("run");
}

#[tokio::test]
async fn non_success_status_is_reported_with_its_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/cache/clear"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = AdminApi::new(&server.uri()).expect("client");
    let err = api.clear_cache().await.unwrap_err();
    assert!(matches!(err, ApiError::Status(503)));
}

#[tokio::test]
async fn transport_failure_is_not_a_status_error() {
    // Nothing listens on this port.
    let api = AdminApi::new("http://127.0.0.1:1").expect("client");
    let err = api.dashboard_stats().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn upload_sends_all_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/admin/content/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = AdminApi::new(&server.uri()).expect("client");
    api.upload_content(UploadPayload {
        file_name: "fr-news.json".to_string(),
        bytes: b"{\"items\":[]}".to_vec(),
        content_type: "news".to_string(),
        country_code: "FR".to_string(),
        region_code: None,
        tags: "breaking,daily".to_string(),
        priority: "HIGH".to_string(),
    })
    .await
    .expect("upload");

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    for field in [
        "name=\"file\"",
        "fr-news.json",
        "name=\"contentType\"",
        "name=\"countryCode\"",
        "name=\"regionCode\"",
        "name=\"tags\"",
        "name=\"priority\"",
    ] {
        assert!(body.contains(field), "missing {field} in multipart body");
    }
}

#[tokio::test]
async fn cache_stats_tolerates_missing_redis_side() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/admin/cache/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"caffeine":{"entries":120,"hitRate":0.93,"missRate":0.07,"evictions":14}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let api = AdminApi::new(&server.uri()).expect("client");
    let stats = api.cache_stats().await.expect("cache stats");
    assert_eq!(stats.caffeine.expect("caffeine").entries, 120);
    assert!(stats.redis.is_none());
}
