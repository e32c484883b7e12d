//! HTTP client that maps failed responses onto [`ApiError`].

use log::debug;
use reqwest::multipart::Form;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ClientError};

/// Thin wrapper over a reqwest `Client` speaking JSON to the inference API.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        debug!("GET JSON from {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ClientError::Network)?;

        read_json(response).await
    }

    /// Performs a POST request with a JSON body and deserializes the JSON response.
    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST JSON to {}...", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Network)?;

        read_json(response).await
    }

    /// Performs a multipart POST request and deserializes the JSON response.
    #[tracing::instrument(skip(self, form))]
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        url: &str,
        form: Form,
    ) -> Result<T, ClientError> {
        debug!("POST multipart to {}...", url);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::Network)?;

        read_json(response).await
    }

    /// Issues a GET request and reports only the response status.
    #[tracing::instrument(skip(self))]
    pub async fn probe(&self, url: &str) -> Result<StatusCode, reqwest::Error> {
        debug!("Probing {}...", url);

        let response = self.client.get(url).send().await?;
        Ok(response.status())
    }
}

/// Passes success responses through and turns everything else into [`ApiError`].
pub async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let err = ApiError::from_body(status.as_u16(), &body);
    debug!("Request failed with {}", err);
    Err(err)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;

    let body = response.bytes().await.map_err(ClientError::Network)?;
    serde_json::from_slice(&body).map_err(ClientError::InvalidResponse)
}
