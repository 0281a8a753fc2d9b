//! # Generic gRPC Client
//!
//! This module wraps a standard `tonic` client to perform unary calls on methods that are only
//! known at runtime.
//!
//! ## How it works
//!
//! [`GrpcTransport`] opens a plain-text HTTP/2 channel to `http://{host}:{port}` and hands back a
//! [`GrpcConnection`]. The connection sends a `DynamicMessage` to the given endpoint path using the
//! [`super::codec::DynamicCodec`], which decodes the reply with the method's output descriptor.
//!
//! ## Features
//!
//! * **Dynamic Pathing**: The HTTP/2 path (e.g., `/package.Service/Method`) is provided at runtime.
//! * **Metadata Handling**: Converts standard Rust string tuples into Tonic's `MetadataMap` for headers.
//! * **Timeouts**: An optional per request timeout is applied to the channel.
use super::codec::DynamicCodec;
use crate::BoxError;
use crate::call::Transport;
use http_body::Body as HttpBody;
use prost_reflect::{DynamicMessage, MessageDescriptor};
use std::str::FromStr;
use std::time::Duration;
use tonic::{
    client::GrpcService,
    metadata::{
        MetadataKey, MetadataValue,
        errors::{InvalidMetadataKey, InvalidMetadataValue},
    },
    transport::{Channel, Endpoint},
};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, #[source] tonic::transport::Error),
    #[error("Failed to connect to '{0}': {1}")]
    ConnectionFailed(String, #[source] tonic::transport::Error),
    #[error("Internal error, the client was not ready: '{0}'")]
    ClientNotReady(#[source] BoxError),
    #[error("Invalid endpoint path '{path}': '{source}'")]
    InvalidPath {
        path: String,
        source: http::uri::InvalidUri,
    },
    #[error("Invalid metadata (header) key '{key}': '{source}'")]
    InvalidMetadataKey {
        key: String,
        source: InvalidMetadataKey,
    },
    #[error("Invalid metadata (header) value for key '{key}': '{source}'")]
    InvalidMetadataValue {
        key: String,
        source: InvalidMetadataValue,
    },
    #[error("gRPC Failed: code={:?} message={:?}", .0.code(), .0.message())]
    Status(#[from] tonic::Status),
}

/// Dials gRPC servers over plain-text HTTP/2.
#[derive(Debug, Clone, Default)]
pub struct GrpcTransport {
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl GrpcTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata attached to every request.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Transport for GrpcTransport {
    type Connection = GrpcConnection<Channel>;

    async fn dial(&self, host: &str, port: u16) -> Result<Self::Connection, TransportError> {
        let addr = format!("http://{host}:{port}");

        let mut endpoint = Endpoint::new(addr.clone())
            .map_err(|e| TransportError::InvalidUrl(addr.clone(), e))?;

        if let Some(timeout) = self.timeout {
            endpoint = endpoint.timeout(timeout);
        }

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| TransportError::ConnectionFailed(addr.clone(), e))?;

        debug!(%addr, "connected");

        Ok(GrpcConnection::new(channel))
    }

    async fn invoke(
        &self,
        connection: &mut Self::Connection,
        path: &str,
        request: DynamicMessage,
        response: MessageDescriptor,
    ) -> Result<DynamicMessage, TransportError> {
        connection
            .unary(path, request, response, &self.headers)
            .await
    }
}

/// An open connection able to perform unary calls with dynamic messages.
#[derive(Debug, Clone)]
pub struct GrpcConnection<S = Channel> {
    client: tonic::client::Grpc<S>,
}

impl<S> GrpcConnection<S>
where
    S: GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    /// Wraps an existing Tonic service (e.g. a `Channel` or an in-process server).
    pub fn new(service: S) -> Self {
        let client = tonic::client::Grpc::new(service);
        Self { client }
    }

    /// Performs a Unary gRPC call (Single Request -> Single Response).
    ///
    /// A status returned by the server is reported as [`TransportError::Status`].
    pub async fn unary(
        &mut self,
        path: &str,
        request: DynamicMessage,
        response: MessageDescriptor,
        headers: &[(String, String)],
    ) -> Result<DynamicMessage, TransportError> {
        self.client
            .ready()
            .await
            .map_err(|e| TransportError::ClientNotReady(e.into()))?;

        let codec = DynamicCodec::new(response);
        let path = http::uri::PathAndQuery::from_str(path).map_err(|source| {
            TransportError::InvalidPath {
                path: path.to_string(),
                source,
            }
        })?;
        let request = build_request(request, headers)?;

        let response = self.client.unary(request, path, codec).await?;

        Ok(response.into_inner())
    }
}

fn build_request<T>(
    payload: T,
    headers: &[(String, String)],
) -> Result<tonic::Request<T>, TransportError> {
    let mut request = tonic::Request::new(payload);
    for (k, v) in headers {
        let key =
            MetadataKey::from_str(k).map_err(|source| TransportError::InvalidMetadataKey {
                key: k.clone(),
                source,
            })?;
        let val = MetadataValue::from_str(v).map_err(|source| {
            TransportError::InvalidMetadataValue {
                key: k.clone(),
                source,
            }
        })?;
        request.metadata_mut().insert(key, val);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_become_metadata() {
        let headers = vec![("x-trace-id".to_string(), "abc".to_string())];

        let request = build_request((), &headers).unwrap();

        let value = request.metadata().get("x-trace-id").unwrap();
        assert_eq!(value.to_str().unwrap(), "abc");
    }

    #[test]
    fn invalid_header_keys_are_rejected() {
        let headers = vec![("bad key".to_string(), "abc".to_string())];

        let err = build_request((), &headers).unwrap_err();

        assert!(matches!(err, TransportError::InvalidMetadataKey { key, .. } if key == "bad key"));
    }
}
