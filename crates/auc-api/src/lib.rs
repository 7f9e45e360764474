use auc_core::{
    ActivityEntry, CacheStats, CollectorRecord, ContentRecord, DashboardStats, LogEntry,
};
use reqwest::multipart;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;
use url::Url;

pub const ADMIN_PREFIX: &str = "/api/v1/admin";
pub const PUSH_PATH: &str = "/ws/admin";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Content upload form, mirroring the server's multipart contract. The file
/// is read by the caller; this layer only ships bytes.
#[derive(Debug, Clone, Default)]
pub struct UploadPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub country_code: String,
    pub region_code: Option<String>,
    pub tags: String,
    pub priority: String,
}

/// Client for the admin REST surface under `/api/v1/admin`.
///
/// Timeout semantics are left to the transport defaults; every non-2xx
/// response is logged with its status code and reported as
/// [`ApiError::Status`].
#[derive(Debug, Clone)]
pub struct AdminApi {
    base: Url,
    client: reqwest::Client,
}

impl AdminApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                base.scheme()
            )));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Push-channel endpoint for this base URL: the scheme mirrors the HTTP
    /// security level (`http` becomes `ws`, `https` becomes `wss`) and the
    /// path is the fixed `/ws/admin`.
    pub fn push_endpoint(&self) -> Result<Url, ApiError> {
        let mut endpoint = self.base.clone();
        let scheme = match self.base.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(ApiError::InvalidUrl(format!("unsupported scheme '{other}'"))),
        };
        endpoint
            .set_scheme(scheme)
            .map_err(|()| ApiError::InvalidUrl(format!("cannot derive {scheme} endpoint")))?;
        endpoint.set_path(PUSH_PATH);
        endpoint.set_query(None);
        Ok(endpoint)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get_json(&self.admin_url("stats")).await
    }

    pub async fn recent_activity(&self) -> Result<Vec<ActivityEntry>, ApiError> {
        self.get_json(&self.admin_url("activity")).await
    }

    pub async fn collectors(&self) -> Result<Vec<CollectorRecord>, ApiError> {
        self.get_json(&self.admin_url("collectors")).await
    }

    pub async fn content(&self) -> Result<Vec<ContentRecord>, ApiError> {
        self.get_json(&self.admin_url("content")).await
    }

    pub async fn cache_stats(&self) -> Result<CacheStats, ApiError> {
        self.get_json(&self.admin_url("cache/stats")).await
    }

    pub async fn logs(&self, level: &str, limit: usize) -> Result<Vec<LogEntry>, ApiError> {
        let mut url = self.admin_url("logs");
        url.query_pairs_mut()
            .append_pair("level", level)
            .append_pair("limit", &limit.to_string());
        self.get_json(&url).await
    }

    pub async fn run_collector(&self, name: &str) -> Result<(), ApiError> {
        self.post_empty(&self.admin_url(&format!("collectors/{name}/run")))
            .await
    }

    pub async fn enable_collector(&self, name: &str) -> Result<(), ApiError> {
        self.post_empty(&self.admin_url(&format!("collectors/{name}/enable")))
            .await
    }

    pub async fn disable_collector(&self, name: &str) -> Result<(), ApiError> {
        self.post_empty(&self.admin_url(&format!("collectors/{name}/disable")))
            .await
    }

    pub async fn clear_cache(&self) -> Result<(), ApiError> {
        self.post_empty(&self.admin_url("cache/clear")).await
    }

    pub async fn upload_content(&self, payload: UploadPayload) -> Result<(), ApiError> {
        let file_part = multipart::Part::bytes(payload.bytes).file_name(payload.file_name);
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("contentType", payload.content_type)
            .text("countryCode", payload.country_code)
            .text("regionCode", payload.region_code.unwrap_or_default())
            .text("tags", payload.tags)
            .text("priority", payload.priority);
        let response = self
            .client
            .post(self.admin_url("content/upload"))
            .multipart(form)
            .send()
            .await?;
        self.check_status(response).map(|_| ())
    }

    fn admin_url(&self, suffix: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("{ADMIN_PREFIX}/{suffix}"));
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ApiError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = self.check_status(response)?;
        Ok(response.json::<T>().await?)
    }

    async fn post_empty(&self, url: &Url) -> Result<(), ApiError> {
        let response = self.client.post(url.clone()).send().await?;
        self.check_status(response).map(|_| ())
    }

    fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            warn!(
                event = "admin_api_status_error",
                status = status.as_u16(),
                url = %response.url()
            );
            Err(ApiError::Status(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_endpoint_mirrors_page_security_level() {
        let api = AdminApi::new("http://ops.example.net:8080").expect("client");
        assert_eq!(
            api.push_endpoint().expect("endpoint").as_str(),
            "ws://ops.example.net:8080/ws/admin"
        );

        let api = AdminApi::new("https://ops.example.net").expect("client");
        assert_eq!(
            api.push_endpoint().expect("endpoint").as_str(),
            "wss://ops.example.net/ws/admin"
        );
    }

    #[test]
    fn push_endpoint_drops_base_path_and_query() {
        let api = AdminApi::new("http://ops.example.net/console?tab=cache").expect("client");
        assert_eq!(
            api.push_endpoint().expect("endpoint").as_str(),
            "ws://ops.example.net/ws/admin"
        );
    }

    #[test]
    fn non_http_base_is_rejected() {
        let err = AdminApi::new("ftp://ops.example.net").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));

        let err = AdminApi::new("not a url").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn admin_urls_share_the_versioned_prefix() {
        let api = AdminApi::new("http://127.0.0.1:8080").expect("client");
        assert_eq!(
            api.admin_url("collectors/google-news/run").as_str(),
            "http://127.0.0.1:8080/api/v1/admin/collectors/google-news/run"
        );
        assert_eq!(
            api.admin_url("cache/stats").as_str(),
            "http://127.0.0.1:8080/api/v1/admin/cache/stats"
        );
    }
}
