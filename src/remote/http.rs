//! HTTP implementation of the image service.

use serde::{Deserialize, Serialize};
use ureq::Agent;

use super::ImageService;
use crate::config::ServiceConfig;
use crate::error::HarvestError;

/// Project identifier sent with every download request.
const PROJECT_ID: &str = "1";

/// Upper bound for a single downloaded image.
const MAX_IMAGE_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    version: &'a str,
    os: &'a str,
}

/// Login response body. The session token rides in `Content`; anything
/// else in the body is ignored.
#[derive(Deserialize)]
struct LoginResponse {
    #[serde(rename = "Content")]
    content: String,
}

pub struct HttpImageService {
    agent: Agent,
    config: ServiceConfig,
    token: Option<String>,
}

impl HttpImageService {
    pub fn new(config: ServiceConfig) -> Self {
        // Non-2xx download responses are handled per file, so statuses
        // must come back as responses rather than transport errors.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            config,
            token: None,
        }
    }
}

impl ImageService for HttpImageService {
    fn authenticate(&mut self) -> Result<(), HarvestError> {
        let url = format!("{}/moblogin", self.config.base_url);
        let request = LoginRequest {
            email: &self.config.email,
            password: &self.config.password,
            version: &self.config.version,
            os: &self.config.os,
        };

        let mut response =
            self.agent
                .post(&url)
                .send_json(&request)
                .map_err(|source| HarvestError::AuthenticationFailed {
                    message: source.to_string(),
                })?;

        if !response.status().is_success() {
            return Err(HarvestError::AuthenticationFailed {
                message: format!("login returned status {}", response.status()),
            });
        }

        let body: LoginResponse = response.body_mut().read_json().map_err(|source| {
            HarvestError::AuthenticationFailed {
                message: format!("unexpected login response shape: {source}"),
            }
        })?;

        self.token = Some(body.content);
        Ok(())
    }

    fn fetch_image(&mut self, file_name: &str) -> Result<Option<Vec<u8>>, HarvestError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| HarvestError::AuthenticationFailed {
                message: "fetch attempted before authentication".to_string(),
            })?;

        let url = format!("{}/getimagefile/{}", self.config.base_url, file_name);
        let mut response = self
            .agent
            .get(&url)
            .header("token", token)
            .header("project_id", PROJECT_ID)
            .call()
            .map_err(|source| HarvestError::Service {
                message: source.to_string(),
            })?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_IMAGE_BYTES)
            .read_to_vec()
            .map_err(|source| HarvestError::Service {
                message: source.to_string(),
            })?;
        Ok(Some(bytes))
    }
}
