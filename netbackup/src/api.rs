//! HTTPS configuration export path.
//!
//! Platforms with an [`ApiExport`] profile are backed up with one
//! authenticated GET; the response body is the configuration, stored
//! verbatim with no sanitizing.
//!
//! Certificate validation is off for these requests. Management interfaces
//! on firewalls almost always present self-signed certificates, and the
//! bearer token is the credential being trusted here, not the certificate.

use async_trait::async_trait;
use log::debug;
use secrecy::ExposeSecret;

use crate::config::BackupConfig;
use crate::error::{ApiError, Result};
use crate::inventory::{Credentials, DeviceDescriptor};
use crate::platform::ApiExport;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs bearer-authenticated GET requests.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, url: &str, api_key: &str) -> Result<ApiResponse>;
}

/// reqwest-backed [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
}

impl HttpApiClient {
    /// Build a client with the run's API timeout and certificate checks disabled.
    pub fn new(config: &BackupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(ApiError::Request)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn get(&self, url: &str, api_key: &str) -> Result<ApiResponse> {
        let response = self
            .client
            .get(url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(ApiError::Request)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(ApiError::Request)?.to_vec();
        Ok(ApiResponse { status, body })
    }
}

/// Export URL for a device.
pub fn export_url(device: &DeviceDescriptor, export: &ApiExport) -> String {
    let port = device.api_port.unwrap_or(export.default_port);
    format!("https://{}:{}{}", device.address, port, export.path)
}

/// Fetch a device's configuration export.
///
/// The device's own key wins over the shared default. Any non-2xx status is
/// an [`ApiError::Status`].
pub async fn fetch_export(
    client: &dyn ApiClient,
    device: &DeviceDescriptor,
    credentials: &Credentials,
    export: &ApiExport,
) -> Result<Vec<u8>> {
    let api_key = device
        .api_key
        .as_ref()
        .or(credentials.api_key.as_ref())
        .ok_or_else(|| ApiError::MissingApiKey {
            device: device.name.clone(),
        })?;

    let url = export_url(device, export);
    debug!("{}: GET {}", device.name, url);

    let response = client.get(&url, api_key.expose_secret()).await?;
    if !(200..300).contains(&response.status) {
        return Err(ApiError::Status {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }
        .into());
    }

    Ok(response.body)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use secrecy::SecretString;

    use super::*;

    struct Recorder {
        status: u16,
        body: &'static [u8],
        calls: Mutex<Vec<(String, String)>>,
    }

    impl Recorder {
        fn new(status: u16, body: &'static [u8]) -> Self {
            Self {
                status,
                body,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ApiClient for Recorder {
        async fn get(&self, url: &str, api_key: &str) -> Result<ApiResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), api_key.to_string()));
            Ok(ApiResponse {
                status: self.status,
                body: self.body.to_vec(),
            })
        }
    }

    fn export() -> ApiExport {
        ApiExport {
            path: "/api/v2/monitor/system/config/backup?scope=global".to_string(),
            default_port: 443,
        }
    }

    fn credentials(api_key: Option<&str>) -> Credentials {
        Credentials {
            username: "backup".to_string(),
            password: SecretString::from("pw"),
            api_key: api_key.map(SecretString::from),
        }
    }

    #[test]
    fn test_export_url() {
        let device = DeviceDescriptor::new("fw1", "10.0.0.2", "fortinet", "fw");
        assert_eq!(
            export_url(&device, &export()),
            "https://10.0.0.2:443/api/v2/monitor/system/config/backup?scope=global"
        );

        let device = device.with_api_port(8443);
        assert!(export_url(&device, &export()).starts_with("https://10.0.0.2:8443/"));
    }

    #[tokio::test]
    async fn test_device_key_overrides_default() {
        let client = Recorder::new(200, b"config-bytes");
        let device = DeviceDescriptor::new("fw1", "10.0.0.2", "fortinet", "fw").with_api_key("own");

        let body = fetch_export(&client, &device, &credentials(Some("shared")), &export())
            .await
            .unwrap();

        assert_eq!(body, b"config-bytes");
        assert_eq!(client.calls.lock().unwrap()[0].1, "own");
    }

    #[tokio::test]
    async fn test_default_key_used() {
        let client = Recorder::new(200, b"x");
        let device = DeviceDescriptor::new("fw1", "10.0.0.2", "fortinet", "fw");

        fetch_export(&client, &device, &credentials(Some("shared")), &export())
            .await
            .unwrap();
        assert_eq!(client.calls.lock().unwrap()[0].1, "shared");
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = Recorder::new(200, b"x");
        let device = DeviceDescriptor::new("fw1", "10.0.0.2", "fortinet", "fw");

        let err = fetch_export(&client, &device, &credentials(None), &export())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Api(ApiError::MissingApiKey { .. })
        ));
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let client = Recorder::new(403, b"forbidden");
        let device = DeviceDescriptor::new("fw1", "10.0.0.2", "fortinet", "fw").with_api_key("k");

        let err = fetch_export(&client, &device, &credentials(None), &export())
            .await
            .unwrap_err();
        match err {
            crate::Error::Api(ApiError::Status { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
