//! FalClient - handles communication with the fal.ai queue API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use super::retry::{is_transient_network_error, parse_retry_after, RetryPolicy};

/// The environment variable name for the fal.ai API key.
pub const FAL_API_KEY_ENV: &str = "FAL_API_KEY";

/// Default base URL for the fal.ai API.
pub const FAL_API_BASE_URL: &str = "https://queue.fal.run";

/// Default model for image generation.
pub const DEFAULT_MODEL: &str = "fal-ai/stable-diffusion-v15";

/// Default timeout for HTTP requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a whole generation (5 minutes).
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Default polling interval for status checks (2 seconds).
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
const HTTP_STATUS_BAD_REQUEST: u16 = 400;
const HTTP_STATUS_FORBIDDEN: u16 = 403;

/// Keywords that indicate a content policy violation in error messages.
const CONTENT_POLICY_KEYWORDS: &[&str] = &[
    "content policy",
    "policy violation",
    "inappropriate",
    "not allowed",
    "prohibited",
    "blocked",
    "unsafe",
    "violates",
    "moderation",
    "nsfw",
];

fn is_content_policy_error(error_text: &str) -> bool {
    let lower = error_text.to_lowercase();
    CONTENT_POLICY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Reject prompts that are empty or whitespace-only.
pub fn validate_prompt(prompt: &str) -> Result<(), FalError> {
    if prompt.trim().is_empty() {
        return Err(FalError::EmptyPrompt);
    }
    Ok(())
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<ImageSize>,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            image_size: None,
            num_inference_steps: 20,
            guidance_scale: 7.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    #[serde(flatten)]
    params: GenerationParams,
}

/// Response from queue submission.
#[derive(Debug, Deserialize)]
pub struct QueueResponse {
    /// The unique request ID for polling.
    pub request_id: String,
    #[serde(default)]
    pub status_url: Option<String>,
    #[serde(default)]
    pub response_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultResponse {
    #[serde(default)]
    images: Vec<GeneratedImage>,
}

/// One image in a completed result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl GeneratedImage {
    /// File extension for this image.
    ///
    /// Taken from the content type, then from the URL path, defaulting to
    /// `png`.
    pub fn extension(&self) -> &'static str {
        let from_content_type = self.content_type.as_deref().and_then(|ct| {
            match ct.split(';').next().unwrap_or("").trim() {
                "image/png" => Some("png"),
                "image/jpeg" | "image/jpg" => Some("jpg"),
                "image/webp" => Some("webp"),
                "image/gif" => Some("gif"),
                _ => None,
            }
        });

        from_content_type
            .or_else(|| {
                let path = self.url.split(['?', '#']).next().unwrap_or("");
                let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase())?;
                match ext.as_str() {
                    "png" => Some("png"),
                    "jpg" | "jpeg" => Some("jpg"),
                    "webp" => Some("webp"),
                    "gif" => Some("gif"),
                    _ => None,
                }
            })
            .unwrap_or("png")
    }
}

/// Status of a queued generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationStatus {
    /// Request is queued for processing.
    Pending,
    /// Image is being generated.
    InProgress,
    /// Generation finished; fetch the result.
    Completed,
    /// Generation failed with an error.
    Failed { error: String },
}

/// Client for communicating with the fal.ai API.
pub struct FalClient {
    api_key: String,
    base_url: String,
    model: String,
    params: GenerationParams,
    retry: RetryPolicy,
    generation_timeout: Duration,
    poll_interval: Duration,
    http_client: reqwest::Client,
}

impl FalClient {
    /// Create a new FalClient by reading the API key from `FAL_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `FalError::MissingApiKey` if the variable is unset or empty.
    pub fn new() -> Result<Self, FalError> {
        let api_key = std::env::var(FAL_API_KEY_ENV).map_err(|_| FalError::MissingApiKey)?;
        Self::with_api_key(api_key)
    }

    /// Create a new FalClient with an explicit API key.
    pub fn with_api_key(api_key: String) -> Result<Self, FalError> {
        Self::with_settings(api_key, FAL_API_BASE_URL.to_string(), DEFAULT_MODEL.to_string())
    }

    /// Create a new FalClient with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, FalError> {
        Self::with_settings(api_key, base_url, DEFAULT_MODEL.to_string())
    }

    /// Create a new FalClient with a custom model.
    pub fn with_model(api_key: String, model: String) -> Result<Self, FalError> {
        Self::with_settings(api_key, FAL_API_BASE_URL.to_string(), model)
    }

    pub fn with_settings(api_key: String, base_url: String, model: String) -> Result<Self, FalError> {
        if api_key.is_empty() {
            return Err(FalError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            params: GenerationParams::default(),
            retry: RetryPolicy::default(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            http_client,
        })
    }

    pub fn params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.generation_timeout
    }

    fn auth_header(&self) -> String {
        format!("Key {}", self.api_key)
    }

    /// Submit an image generation request to the fal.ai queue.
    ///
    /// # Errors
    ///
    /// `FalError::EmptyPrompt` for a blank prompt,
    /// `FalError::ContentPolicyViolation` if the prompt is refused,
    /// `FalError::RateLimit` on HTTP 429,
    /// `FalError::ApiError` for any other error response,
    /// `FalError::HttpError` if the request itself fails.
    pub async fn submit_generation(&self, prompt: &str) -> Result<QueueResponse, FalError> {
        validate_prompt(prompt)?;

        let url = format!("{}/{}", self.base_url, self.model);
        let request_body = GenerateRequest {
            prompt,
            params: self.params,
        };

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();

            if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
                let retry_after_secs = parse_retry_after(&response);
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Rate limit exceeded".to_string());
                log::warn!(
                    "Rate limited by fal.ai API. Retry-After: {:?} seconds",
                    retry_after_secs
                );
                return Err(FalError::RateLimit {
                    message: error_text,
                    retry_after_secs,
                });
            }

            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if (status.as_u16() == HTTP_STATUS_BAD_REQUEST
                || status.as_u16() == HTTP_STATUS_FORBIDDEN)
                && is_content_policy_error(&error_text)
            {
                log::warn!("Prompt rejected by content policy: {}", error_text);
                return Err(FalError::ContentPolicyViolation {
                    message: error_text,
                });
            }

            return Err(FalError::ApiError(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }

    /// Submit with the client's retry policy.
    ///
    /// Rate limits wait for Retry-After (or exponential backoff); transient
    /// network errors back off exponentially. Other errors are returned
    /// straight away.
    ///
    /// # Errors
    ///
    /// `FalError::RateLimit` once rate-limit retries run out,
    /// `FalError::NetworkError` once network retries run out, otherwise
    /// whatever `submit_generation` returned.
    pub async fn submit_generation_with_retry(&self, prompt: &str) -> Result<QueueResponse, FalError> {
        let policy = self.retry;
        let mut rate_limit_attempts = 0u32;
        let mut network_attempts = 0u32;

        loop {
            let err = match self.submit_generation(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            let delay = match err {
                FalError::RateLimit {
                    ref message,
                    retry_after_secs,
                } => {
                    if rate_limit_attempts >= policy.max_rate_limit_retries {
                        log::error!(
                            "Rate limit exceeded after {} attempts. Giving up.",
                            rate_limit_attempts + 1
                        );
                        return Err(FalError::RateLimit {
                            message: message.clone(),
                            retry_after_secs,
                        });
                    }
                    let delay = policy.delay(rate_limit_attempts, retry_after_secs);
                    rate_limit_attempts += 1;
                    log::info!(
                        "Rate limited (attempt {}/{}). Retrying in {:?}...",
                        rate_limit_attempts,
                        policy.max_rate_limit_retries + 1,
                        delay
                    );
                    delay
                }
                FalError::HttpError(ref e) if is_transient_network_error(e) => {
                    if network_attempts >= policy.max_network_retries {
                        log::error!(
                            "Network error after {} attempts: {}",
                            network_attempts + 1,
                            e
                        );
                        return Err(FalError::NetworkError {
                            message: e.to_string(),
                            attempts: network_attempts + 1,
                        });
                    }
                    let delay = policy.delay(network_attempts, None);
                    network_attempts += 1;
                    log::warn!(
                        "Transient network error (attempt {}/{}): {}. Retrying in {:?}...",
                        network_attempts,
                        policy.max_network_retries + 1,
                        e,
                        delay
                    );
                    delay
                }
                other => return Err(other),
            };

            tokio::time::sleep(delay).await;
        }
    }

    /// Check generation status.
    ///
    /// # Errors
    ///
    /// `FalError::HttpError` if the request fails, `FalError::ApiError` for an
    /// error response or an unrecognized status.
    pub async fn poll_status(&self, request_id: &str) -> Result<GenerationStatus, FalError> {
        let url = format!(
            "{}/{}/requests/{}/status",
            self.base_url, self.model, request_id
        );

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FalError::ApiError(format!(
                "Status check failed with status {}: {}",
                status, error_text
            )));
        }

        let status_response: StatusResponse = response.json().await?;

        match status_response.status.to_uppercase().as_str() {
            "PENDING" | "IN_QUEUE" => Ok(GenerationStatus::Pending),
            "PROCESSING" | "IN_PROGRESS" => Ok(GenerationStatus::InProgress),
            "COMPLETED" | "OK" => Ok(GenerationStatus::Completed),
            "FAILED" | "ERROR" => Ok(GenerationStatus::Failed {
                error: status_response
                    .error
                    .unwrap_or_else(|| "Unknown error occurred during generation".to_string()),
            }),
            unknown => Err(FalError::ApiError(format!(
                "Unknown generation status: {}",
                unknown
            ))),
        }
    }

    /// Fetch the first image of a completed request.
    ///
    /// # Errors
    ///
    /// `FalError::NoImages` if the result lists no images.
    pub async fn fetch_result(&self, request_id: &str) -> Result<GeneratedImage, FalError> {
        let url = format!("{}/{}/requests/{}", self.base_url, self.model, request_id);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FalError::ApiError(format!(
                "Result fetch failed with status {}: {}",
                status, error_text
            )));
        }

        let result: ResultResponse = response.json().await?;
        result.images.into_iter().next().ok_or(FalError::NoImages)
    }

    /// Stream an image from `url` to `dest`, creating parent directories.
    pub async fn download_image(&self, url: &str, dest: &Path) -> Result<PathBuf, FalError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FalError::ApiError(format!(
                "Image download failed with status {}: {}",
                status, error_text
            )));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();

        use futures_util::StreamExt;
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        Ok(dest.to_path_buf())
    }

    /// Generate an image and save it as `<output_dir>/<stem>.<ext>`.
    ///
    /// Submits (with retry), polls until completion or until the client's
    /// generation timeout elapses, then downloads the first image.
    pub async fn generate_and_download(
        &self,
        prompt: &str,
        output_dir: &Path,
        stem: &str,
    ) -> Result<PathBuf, FalError> {
        use tokio::time::Instant;

        log::info!("Submitting image generation for prompt: {}", prompt);
        let queue_response = self.submit_generation_with_retry(prompt).await?;
        let request_id = &queue_response.request_id;
        log::debug!("Generation submitted, request_id: {}", request_id);

        let start_time = Instant::now();
        loop {
            if start_time.elapsed() > self.generation_timeout {
                log::error!("Generation timed out after {:?}", self.generation_timeout);
                return Err(FalError::Timeout);
            }

            match self.poll_status(request_id).await? {
                GenerationStatus::Pending => log::debug!("Status: pending, waiting..."),
                GenerationStatus::InProgress => log::debug!("Status: generating..."),
                GenerationStatus::Completed => break,
                GenerationStatus::Failed { error } => {
                    log::error!("Generation failed: {}", error);
                    return Err(FalError::ApiError(format!("Generation failed: {}", error)));
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        let image = self.fetch_result(request_id).await?;
        let dest = output_dir.join(format!("{}.{}", stem, image.extension()));
        log::debug!("Downloading image from: {}", image.url);
        let path = self.download_image(&image.url, &dest).await?;
        log::info!("Image saved to {}", path.display());

        Ok(path)
    }
}

/// Errors that can occur during fal.ai operations.
#[derive(Debug, thiserror::Error)]
pub enum FalError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Generation timed out")]
    Timeout,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Rate limited: {message}")]
    RateLimit {
        message: String,
        /// Retry-After header value in seconds, if provided
        retry_after_secs: Option<u64>,
    },

    #[error("Network error: {message} (after {attempts} attempts)")]
    NetworkError { message: String, attempts: u32 },

    #[error("Content policy violation: {message}")]
    ContentPolicyViolation { message: String },

    #[error("Generation completed without images")]
    NoImages,

    #[error("Empty prompt")]
    EmptyPrompt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_api_key_creates_client() {
        let client = FalClient::with_api_key("test-api-key".to_string()).unwrap();
        assert_eq!(client.api_key(), "test-api-key");
        assert_eq!(client.base_url(), FAL_API_BASE_URL);
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.timeout(), DEFAULT_GENERATION_TIMEOUT);
    }

    #[test]
    fn test_empty_key_returns_error() {
        assert!(matches!(
            FalClient::with_api_key(String::new()),
            Err(FalError::MissingApiKey)
        ));
        assert!(matches!(
            FalClient::with_model(String::new(), "m".to_string()),
            Err(FalError::MissingApiKey)
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            FalClient::with_base_url("k".to_string(), "http://localhost:1234/".to_string())
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
    }

    #[test]
    fn test_validate_prompt() {
        assert!(validate_prompt("grilled halloumi").is_ok());
        assert!(matches!(validate_prompt(""), Err(FalError::EmptyPrompt)));
        assert!(matches!(validate_prompt(" \n\t "), Err(FalError::EmptyPrompt)));
    }

    #[test]
    fn test_content_policy_detection() {
        assert!(is_content_policy_error("Request blocked by MODERATION"));
        assert!(!is_content_policy_error("invalid image_size"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            prompt: "falafel",
            params: GenerationParams::default(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["prompt"], "falafel");
        assert_eq!(json["num_inference_steps"], 20);
        assert_eq!(json["guidance_scale"], 7.5);
        assert!(json.get("image_size").is_none());
    }

    #[test]
    fn test_image_extension() {
        let image = |url: &str, ct: Option<&str>| GeneratedImage {
            url: url.to_string(),
            content_type: ct.map(str::to_string),
        };
        assert_eq!(image("https://x/a", Some("image/jpeg")).extension(), "jpg");
        assert_eq!(image("https://x/a.webp?sig=1", None).extension(), "webp");
        assert_eq!(image("https://x/a.bin", None).extension(), "png");
        assert_eq!(image("https://x/a", Some("image/png; q=1")).extension(), "png");
    }
}
