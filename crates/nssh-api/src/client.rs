//! Directory API client

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use nssh_core::config::{ApiVersion, CoverageType, Profile};
use nssh_core::{
    Device, DeviceId, DeviceRecord, Directory, DirectoryError, PortMapping, Sim, Subscriber,
};

/// Response header carrying the continuation key of a paged query
pub const NEXT_KEY_HEADER: &str = "X-Soracom-Next-Key";

/// Lifetime requested for API tokens
pub const TOKEN_TIMEOUT_SECONDS: u64 = 86400;

const API_KEY_HEADER: &str = "X-Soracom-API-Key";
const TOKEN_HEADER: &str = "X-Soracom-Token";
const LANG_HEADER: &str = "X-Soracom-Lang";

/// Devices per page when listing everything online
const PAGE_LIMIT: &str = "100";

#[derive(Debug, Clone)]
struct ApiCredentials {
    api_key: String,
    token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    token: String,
}

/// Client for the device directory and port mapping API
#[derive(Debug, Clone)]
pub struct SoracomClient {
    http: Client,
    endpoint: String,
    api: ApiVersion,
    credentials: Option<ApiCredentials>,
}

impl SoracomClient {
    /// Create an unauthenticated client for `endpoint` (scheme and host, no path)
    pub fn new(endpoint: impl Into<String>, api: ApiVersion) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api,
            credentials: None,
        }
    }

    /// Pick the regional endpoint for `coverage` and authenticate with `profile`
    pub async fn login(
        profile: &Profile,
        coverage: CoverageType,
        api: ApiVersion,
    ) -> Result<Self, DirectoryError> {
        let mut client = Self::new(coverage.api_endpoint(), api);
        client
            .authenticate(&profile.auth_key_id, &profile.auth_key)
            .await?;
        Ok(client)
    }

    /// Exchange an auth key pair for an API key and token
    pub async fn authenticate(
        &mut self,
        auth_key_id: &str,
        auth_key: &str,
    ) -> Result<(), DirectoryError> {
        let body = json!({
            "authKeyId": auth_key_id,
            "authKey": auth_key,
            "tokenTimeoutSeconds": TOKEN_TIMEOUT_SECONDS,
        });

        let response = self.send(Method::POST, "auth", &[], Some(&body)).await?;
        let auth: AuthResponse = decode(response, "auth response").await?;

        if auth.api_key.is_empty() || auth.token.is_empty() {
            return Err(DirectoryError::Auth(
                "response did not include an API key and token".to_string(),
            ));
        }

        tracing::debug!("Authenticated against {}", self.endpoint);
        self.credentials = Some(ApiCredentials {
            api_key: auth.api_key,
            token: auth.token,
        });
        Ok(())
    }

    /// Which device representation this client queries
    pub fn api_version(&self) -> ApiVersion {
        self.api
    }

    fn query_path(&self) -> &'static str {
        match self.api {
            ApiVersion::Sims => "query/sims",
            ApiVersion::Subscribers => "query/subscribers",
        }
    }

    fn destination_key(&self) -> &'static str {
        match self.api {
            ApiVersion::Sims => "simId",
            ApiVersion::Subscribers => "imsi",
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<Response, DirectoryError> {
        let url = format!("{}/v1/{}", self.endpoint, path);
        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(LANG_HEADER, "en")
            .header(CONTENT_TYPE, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(credentials) = &self.credentials {
            request = request
                .header(API_KEY_HEADER, &credentials.api_key)
                .header(TOKEN_HEADER, &credentials.token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!("{} {}", method, url);
        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        if response.status().as_u16() >= 400 {
            return Err(DirectoryError::Status {
                status: response.status().to_string(),
                method: method.to_string(),
                url: response.url().to_string(),
            });
        }

        Ok(response)
    }

    /// Fetch one page of devices and the continuation key, if any
    async fn fetch_devices(
        &self,
        query: &[(&str, String)],
    ) -> Result<(Vec<Device>, Option<String>), DirectoryError> {
        let response = self.send(Method::GET, self.query_path(), query, None).await?;

        let next_key = response
            .headers()
            .get(NEXT_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let devices = match self.api {
            ApiVersion::Sims => decode::<Vec<Sim>>(response, "SIM list")
                .await?
                .into_iter()
                .map(Device::from)
                .collect(),
            ApiVersion::Subscribers => decode::<Vec<Subscriber>>(response, "subscriber list")
                .await?
                .into_iter()
                .map(Device::from)
                .collect(),
        };

        Ok((devices, next_key))
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    what: &'static str,
) -> Result<T, DirectoryError> {
    response.json::<T>().await.map_err(|e| DirectoryError::Decode {
        what,
        message: e.to_string(),
    })
}

#[async_trait]
impl Directory for SoracomClient {
    async fn search_by_name(&self, name: &str) -> Result<Vec<Device>, DirectoryError> {
        let (devices, _) = self.fetch_devices(&[("name", name.to_string())]).await?;
        tracing::debug!("{} device(s) named {:?}", devices.len(), name);
        Ok(devices)
    }

    async fn list_all_online(&self) -> Result<Vec<Device>, DirectoryError> {
        let mut devices = Vec::new();
        let mut last_key: Option<String> = None;

        loop {
            let mut query = vec![
                ("limit", PAGE_LIMIT.to_string()),
                ("session_status", "ONLINE".to_string()),
                ("search_type", "AND".to_string()),
            ];
            if let Some(key) = last_key.take() {
                query.push(("last_evaluated_key", key));
            }

            let (page, next_key) = self.fetch_devices(&query).await?;
            devices.extend(page);

            match next_key {
                Some(key) => last_key = Some(key),
                None => break,
            }
        }

        tracing::debug!("{} online device(s)", devices.len());
        Ok(devices)
    }

    async fn get_by_id(&self, id: &DeviceId) -> Result<Device, DirectoryError> {
        match self.api {
            ApiVersion::Sims => {
                let query = [("limit", "1".to_string()), ("sim_id", id.to_string())];
                let (devices, _) = self.fetch_devices(&query).await?;
                devices
                    .into_iter()
                    .next()
                    .ok_or_else(|| DirectoryError::NotFound(id.to_string()))
            }
            ApiVersion::Subscribers => {
                let path = format!("subscribers/{}", id);
                let response = self.send(Method::GET, &path, &[], None).await?;
                let subscriber: Subscriber = decode(response, "subscriber").await?;
                Ok(Device::from(subscriber))
            }
        }
    }

    async fn list_port_mappings(&self) -> Result<Vec<PortMapping>, DirectoryError> {
        let response = self.send(Method::GET, "port_mappings", &[], None).await?;
        decode(response, "port mapping list").await
    }

    async fn port_mappings_for(&self, device: &Device) -> Result<Vec<PortMapping>, DirectoryError> {
        let path = match self.api {
            ApiVersion::Sims => format!("port_mappings/sims/{}", device.identifier()),
            ApiVersion::Subscribers => format!("port_mappings/subscribers/{}", device.identifier()),
        };
        let response = self.send(Method::GET, &path, &[], None).await?;
        decode(response, "port mapping list").await
    }

    async fn create_port_mapping(
        &self,
        device: &Device,
        port: u16,
        duration_secs: u64,
    ) -> Result<PortMapping, DirectoryError> {
        let mut destination = serde_json::Map::new();
        destination.insert(self.destination_key().to_string(), json!(device.identifier()));
        destination.insert("port".to_string(), json!(port));

        let body = json!({
            "duration": duration_secs,
            "tlsRequired": false,
            "destination": destination,
        });

        let response = self
            .send(Method::POST, "port_mappings", &[], Some(&body))
            .await?;
        decode(response, "port mapping").await
    }
}
