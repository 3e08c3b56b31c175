use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::config::ElevationConfig;

/// Anything that can answer "how high is the ground here". `None` means unknown.
pub trait ElevationSource {
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<f64>;
}

/// Source used when lookups are switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoElevation;

impl ElevationSource for NoElevation {
    fn lookup(&self, _latitude: f64, _longitude: f64) -> Option<f64> {
        None
    }
}

/// A height given by the user instead of looked up.
#[derive(Clone, Copy, Debug)]
pub struct FixedElevation(pub f64);

impl ElevationSource for FixedElevation {
    fn lookup(&self, _latitude: f64, _longitude: f64) -> Option<f64> {
        Some(self.0)
    }
}

impl<T: ElevationSource + ?Sized> ElevationSource for Box<T> {
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<f64> {
        (**self).lookup(latitude, longitude)
    }
}

#[derive(Debug)]
pub enum ElevationError {
    Runtime(std::io::Error),
    Http(reqwest::Error),
    Status(StatusCode),
    Decode(serde_json::Error),
    MissingHeight,
}

impl fmt::Display for ElevationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime(err) => write!(f, "failed to start http runtime: {err}"),
            Self::Http(err) => write!(f, "elevation request failed: {err}"),
            Self::Status(status) => write!(f, "elevation service returned {status}"),
            Self::Decode(err) => write!(f, "malformed elevation response: {err}"),
            Self::MissingHeight => write!(f, "elevation response has no points[0].z"),
        }
    }
}

impl std::error::Error for ElevationError {}

impl From<reqwest::Error> for ElevationError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for ElevationError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ElevationResponse {
    #[serde(default)]
    points: Vec<ElevationPoint>,
}

#[derive(Debug, Deserialize)]
struct ElevationPoint {
    z: Option<f64>,
}

/// Blocking client for the height service.
/// It keeps a current-thread Tokio runtime so each lookup is one synchronous call.
pub struct ElevationClient {
    client: reqwest::Client,
    runtime: Runtime,
    config: ElevationConfig,
}

impl ElevationClient {
    pub fn new(config: ElevationConfig) -> Result<Self, ElevationError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ElevationError::Runtime)?;

        Ok(Self {
            client,
            runtime,
            config,
        })
    }

    pub fn config(&self) -> &ElevationConfig {
        &self.config
    }

    /// One GET, no retries. Errors are returned as-is; [`ElevationSource::lookup`]
    /// is the lenient wrapper.
    pub fn fetch(&self, latitude: f64, longitude: f64) -> Result<f64, ElevationError> {
        let request = self.client.get(&self.config.endpoint).query(&[
            ("koordsys", self.config.coordinate_system.to_string()),
            ("nord", latitude.to_string()),
            ("ost", longitude.to_string()),
            ("geojson", String::from("false")),
        ]);

        let body = self.runtime.block_on(async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ElevationError::Status(status));
            }
            Ok::<_, ElevationError>(response.text().await?)
        })?;

        parse_height(&body)
    }
}

impl ElevationSource for ElevationClient {
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<f64> {
        match self.fetch(latitude, longitude) {
            Ok(height) => {
                debug!(latitude, longitude, height, "elevation lookup succeeded");
                Some(height)
            }
            Err(err) => {
                warn!(latitude, longitude, error = %err, "elevation lookup failed, height unknown");
                None
            }
        }
    }
}

fn parse_height(body: &str) -> Result<f64, ElevationError> {
    let response: ElevationResponse = serde_json::from_str(body)?;
    response
        .points
        .first()
        .and_then(|point| point.z)
        .ok_or(ElevationError::MissingHeight)
}
