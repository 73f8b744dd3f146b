use crate::InfluxError;
use crate::WriteRecord;

/// Configuration of an InfluxDB 2.x connection
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    /// Base URL of the InfluxDB instance, e.g. `http://localhost:8086`
    pub url: String,

    /// API token granting write access to the bucket
    pub token: String,

    /// Organization owning the bucket
    pub org: String,

    /// Bucket the records are written to
    pub bucket: String,
}

impl InfluxConfig {
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        org: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            org: org.into(),
            bucket: bucket.into(),
        }
    }
}

/// A connection to the write API of an InfluxDB instance
#[derive(Debug)]
pub struct InfluxClient {
    http: reqwest::Client,
    config: InfluxConfig,
}

impl InfluxClient {
    pub fn new(config: InfluxConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Submit one record, with second-level time precision.
    ///
    /// The call is fire-and-forget from the caller's perspective:
    /// there is no retry and a failure only surfaces as the returned error.
    pub async fn write(&self, record: &WriteRecord) -> Result<(), InfluxError> {
        let line = record.to_line_protocol()?;
        let url = format!("{}/api/v2/write", self.config.url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "s"),
            ])
            .header("Authorization", format!("Token {}", self.config.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InfluxError::ErrorResponse {
                status: status.as_u16(),
                message: message_excerpt(response).await,
            });
        }

        Ok(())
    }
}

/// The beginning of the error body, enough to identify the rejection cause.
async fn message_excerpt(response: reqwest::Response) -> String {
    const EXCERPT_LEN: usize = 200;
    let body = response.text().await.unwrap_or_default();
    body.chars().take(EXCERPT_LEN).collect()
}
