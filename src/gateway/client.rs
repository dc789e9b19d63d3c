use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder, Response, StatusCode};

use crate::{error::Error, logger};

use super::{
    credentials::{CredentialSource, StaticCredentials},
    resource::{HttpRoute, RouteSpecPatch},
};

pub const X_USER_HEADER: &str = "X-User";

const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// Operations against a named, namespaced routing resource in the remote
/// store. No retries here; retry policy, if any, belongs to the caller.
#[async_trait]
pub trait GatewayClientRequest: Send + Sync {
    async fn get_route(&self, namespace: &str, name: &str) -> Result<HttpRoute, Error>;

    /// Full replace of the stored resource.
    async fn replace_route(
        &self,
        namespace: &str,
        name: &str,
        route: &HttpRoute,
    ) -> Result<HttpRoute, Error>;

    /// Merge-patch of the `spec` sub-document only.
    async fn patch_route_spec(
        &self,
        namespace: &str,
        name: &str,
        patch: &RouteSpecPatch,
    ) -> Result<HttpRoute, Error>;
}

/// HTTP client for the gateway facade.
///
/// Credentials come from an injected [`CredentialSource`]; their absence is
/// not an error at this layer. An unauthorized request simply comes back as
/// a non-success response, which is surfaced with the store's body text.
#[derive(Clone)]
pub struct GatewayClient<S = StaticCredentials> {
    client: Client,
    base_url: String,
    credentials: S,
}

impl<S: CredentialSource> GatewayClient<S> {
    pub fn new(client: Client, base_url: impl Into<String>, credentials: S) -> Self {
        let url: String = base_url.into();
        let base_url = if let Some(url) = url.strip_suffix('/') {
            url.to_string()
        } else {
            url
        };

        Self {
            client,
            base_url,
            credentials,
        }
    }

    fn route_url(&self, namespace: &str, name: &str) -> String {
        format!("{}/httproute/{}/{}", self.base_url, namespace, name)
    }

    fn with_credentials(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder;

        if let Some(user) = self.credentials.user() {
            builder = builder.header(X_USER_HEADER, user);
        }

        if let Some(token) = self.credentials.token() {
            builder = builder.bearer_auth(token);
        }

        builder
    }
}

async fn split_response(res: Response) -> Result<(StatusCode, String), Error> {
    let status = res.status();
    let body = res.text().await?;
    Ok((status, body))
}

fn decode_body(body: &str) -> Result<HttpRoute, Error> {
    serde_json::from_str(body).map_err(Error::from)
}

#[async_trait]
impl<S: CredentialSource> GatewayClientRequest for GatewayClient<S> {
    async fn get_route(&self, namespace: &str, name: &str) -> Result<HttpRoute, Error> {
        let url = self.route_url(namespace, name);

        logger!(debug, "GET {}", url);

        let res = self.with_credentials(self.client.get(&url)).send().await?;

        let (status, body) = split_response(res).await?;

        if !status.is_success() {
            return Err(Error::Retrieval { status, body });
        }

        decode_body(&body)
    }

    async fn replace_route(
        &self,
        namespace: &str,
        name: &str,
        route: &HttpRoute,
    ) -> Result<HttpRoute, Error> {
        let url = self.route_url(namespace, name);

        logger!(debug, "PUT {}", url);

        let res = self
            .with_credentials(self.client.put(&url).json(route))
            .send()
            .await?;

        let (status, body) = split_response(res).await?;

        if status == StatusCode::CONFLICT {
            return Err(Error::Conflict { body });
        }

        if !status.is_success() {
            return Err(Error::Write { status, body });
        }

        decode_body(&body)
    }

    async fn patch_route_spec(
        &self,
        namespace: &str,
        name: &str,
        patch: &RouteSpecPatch,
    ) -> Result<HttpRoute, Error> {
        let url = self.route_url(namespace, name);

        logger!(debug, "PATCH {}", url);

        let body = serde_json::to_vec(&serde_json::json!({ "spec": patch }))?;

        let res = self
            .with_credentials(
                self.client
                    .patch(&url)
                    .header(CONTENT_TYPE, MERGE_PATCH_CONTENT_TYPE)
                    .body(body),
            )
            .send()
            .await?;

        let (status, body) = split_response(res).await?;

        if status == StatusCode::CONFLICT {
            return Err(Error::Conflict { body });
        }

        if !status.is_success() {
            return Err(Error::Write { status, body });
        }

        decode_body(&body)
    }
}
