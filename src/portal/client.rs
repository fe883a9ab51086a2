use crate::error::{PortalError, PortalResult};
use crate::portal::types::{AccessPoint, ConnectionStatus, PortalConfig};
use reqwest::{
    Client, Method, Response,
    header::{CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue},
};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const AP_ENDPOINT: &str = "/ap.json";
pub const STATUS_ENDPOINT: &str = "/status.json";
pub const CONFIG_ENDPOINT: &str = "/config.json";
pub const CONNECT_ENDPOINT: &str = "/connect.json";
pub const FACTORY_ENDPOINT: &str = "/factory.json";

const SSID_HEADER: &str = "x-custom-ssid";
const PWD_HEADER: &str = "x-custom-pwd";
const AUTOEXEC_HEADER: &str = "x-custom-autoexec";
const AUTOEXEC1_HEADER: &str = "x-custom-autoexec1";

/// HTTP client for the device's configuration portal
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(base_url: &str, timeout: Duration) -> PortalResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://"))
            || base_url.len() <= "https://".len()
        {
            return Err(PortalError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| PortalError::Http {
                endpoint: "client",
                source,
            })?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Latest scan result
    pub async fn access_points(&self) -> PortalResult<Vec<AccessPoint>> {
        self.get_json(AP_ENDPOINT).await
    }

    pub async fn status(&self) -> PortalResult<ConnectionStatus> {
        self.get_json(STATUS_ENDPOINT).await
    }

    pub async fn config(&self) -> PortalResult<PortalConfig> {
        self.get_json(CONFIG_ENDPOINT).await
    }

    /// Ask the device to join `ssid`. The outcome shows up in later status polls.
    pub async fn connect(&self, ssid: &str, password: &SecretString) -> PortalResult<()> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, SSID_HEADER, ssid, false)?;
        insert_header(&mut headers, PWD_HEADER, password.expose_secret(), true)?;
        self.send_command(Method::POST, CONNECT_ENDPOINT, headers)
            .await
    }

    pub async fn disconnect(&self) -> PortalResult<()> {
        self.send_command(Method::DELETE, CONNECT_ENDPOINT, HeaderMap::new())
            .await
    }

    /// Reboot the device into its factory partition
    pub async fn factory_reset(&self) -> PortalResult<()> {
        self.send_command(Method::POST, FACTORY_ENDPOINT, HeaderMap::new())
            .await
    }

    pub async fn save_config(&self, autoexec: bool, autoexec1: &str) -> PortalResult<()> {
        let mut headers = HeaderMap::new();
        insert_header(
            &mut headers,
            AUTOEXEC_HEADER,
            if autoexec { "1" } else { "0" },
            false,
        )?;
        insert_header(&mut headers, AUTOEXEC1_HEADER, autoexec1, false)?;
        self.send_command(Method::POST, CONFIG_ENDPOINT, headers)
            .await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str) -> PortalResult<T> {
        let response = self
            .request(Method::GET, endpoint)
            .send()
            .await
            .map_err(|source| PortalError::Http { endpoint, source })?;
        let response = check_status(endpoint, response)?;
        let body = response
            .bytes()
            .await
            .map_err(|source| PortalError::Http { endpoint, source })?;
        serde_json::from_slice(&body).map_err(|source| PortalError::Decode { endpoint, source })
    }

    async fn send_command(
        &self,
        method: Method,
        endpoint: &'static str,
        headers: HeaderMap,
    ) -> PortalResult<()> {
        debug!(%method, endpoint, "sending command");
        let response = self
            .request(method, endpoint)
            .headers(headers)
            .send()
            .await
            .map_err(|source| PortalError::Http { endpoint, source })?;
        check_status(endpoint, response)?;
        Ok(())
    }

    fn request(&self, method: Method, endpoint: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(endpoint))
            .query(&[("timestamp", timestamp_ms())])
            .header(CACHE_CONTROL, "no-cache")
    }
}

fn check_status(endpoint: &'static str, response: Response) -> PortalResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(PortalError::Status {
            endpoint,
            code: status.as_u16(),
        })
    }
}

fn insert_header(
    headers: &mut HeaderMap,
    name: &'static str,
    value: &str,
    sensitive: bool,
) -> PortalResult<()> {
    let mut value = HeaderValue::from_bytes(value.as_bytes())
        .map_err(|_| PortalError::InvalidHeader { header: name })?;
    value.set_sensitive(sensitive);
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
