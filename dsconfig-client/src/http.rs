use async_trait::async_trait;
use reqwest::{Certificate, Client, Method, StatusCode, Url};
use serde_json::Value;

use crate::{api::ConfigApi, error::ApiError, operation::UpdateRequest, path::ObjectPath};

/// Connection settings for [`HttpConfigApi`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the server, e.g. `https://localhost:1443`.
    pub https_host: String,
    pub username: String,
    pub password: String,
    /// Accept any server certificate. Only meant for test deployments.
    pub insecure_trust_all_tls: bool,
    /// Additional trusted CA certificates, PEM encoded.
    pub ca_certificates_pem: Vec<Vec<u8>>,
    pub user_agent: String,
}

/// [`ConfigApi`] over HTTPS with basic authentication.
pub struct HttpConfigApi {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl HttpConfigApi {
    pub fn new(config: HttpConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if config.insecure_trust_all_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        for pem in &config.ca_certificates_pem {
            builder = builder.add_root_certificate(Certificate::from_pem(pem)?);
        }
        let client = builder.build()?;

        let mut base_url = Url::parse(&config.https_host)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.https_host, e)))?;
        base_url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(config.https_host.clone()))?
            .pop_if_empty()
            .extend(["config", "v2"]);

        Ok(HttpConfigApi {
            client,
            base_url,
            username: config.username,
            password: config.password,
        })
    }

    fn url(&self, path: &ObjectPath) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .extend(path.segments());
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        path: &ObjectPath,
        url: Url,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .basic_auth(&self.username, Some(&self.password));
        match body {
            Some(body) => {
                tracing::debug!(%method, %path, %body, "configuration API request");
                request = request.json(&body);
            }
            None => {
                tracing::debug!(%method, %path, "configuration API request");
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%method, %path, status = status.as_u16(), body = %text, "configuration API response");

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ConfigApi for HttpConfigApi {
    async fn get(&self, path: &ObjectPath) -> Result<Value, ApiError> {
        self.send(Method::GET, path, self.url(path)?, None).await
    }

    async fn add(&self, collection: &ObjectPath, body: Value) -> Result<Value, ApiError> {
        self.send(Method::POST, collection, self.url(collection)?, Some(body))
            .await
    }

    async fn update(&self, path: &ObjectPath, request: &UpdateRequest) -> Result<Value, ApiError> {
        let body = serde_json::to_value(request)?;
        self.send(Method::PATCH, path, self.url(path)?, Some(body))
            .await
    }

    async fn delete(&self, path: &ObjectPath) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, self.url(path)?, None)
            .await
            .map(|_| ())
    }

    async fn list(
        &self,
        collection: &ObjectPath,
        filter: Option<&str>,
    ) -> Result<Vec<Value>, ApiError> {
        let mut url = self.url(collection)?;
        if let Some(filter) = filter {
            url.query_pairs_mut().append_pair("filter", filter);
        }
        let body = self.send(Method::GET, collection, url, None).await?;
        match body.get("Resources") {
            Some(Value::Array(resources)) => Ok(resources.clone()),
            Some(_) => Err(ApiError::Decode(serde::de::Error::custom(
                "list response field Resources is not an array",
            ))),
            None => Ok(Vec::new()),
        }
    }
}
