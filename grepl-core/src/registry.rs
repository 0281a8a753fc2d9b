//! # Descriptor Registry
//!
//! This module handles the loading and querying of Protobuf `FileDescriptorSet`s.
//! It acts as a database of schema definitions, allowing the session to resolve a method name
//! into the descriptors of its request and response messages.
use prost_reflect::{DescriptorPool, MessageDescriptor, MethodDescriptor, ServiceDescriptor};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to read descriptor file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode descriptor set: {0}")]
    Decode(#[from] prost_reflect::DescriptorError),
    #[error("Service '{0}' not found")]
    ServiceNotFound(String),
    #[error("Method '{0}' not found")]
    MethodNotFound(String),
    #[error("No service selected")]
    NoServiceSelected,
    #[error("Method '{0}' is a streaming method, only unary methods can be called")]
    StreamingMethod(String),
}

impl SchemaError {
    /// Whether the error means that the requested symbol does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SchemaError::ServiceNotFound(_) | SchemaError::MethodNotFound(_)
        )
    }
}

/// A resolved method, ready to be called.
#[derive(Debug, Clone)]
pub struct Procedure {
    pub package: String,
    pub service: String,
    pub method: MethodDescriptor,
}

impl Procedure {
    pub fn name(&self) -> &str {
        self.method.name()
    }

    /// The request message schema.
    pub fn input(&self) -> MessageDescriptor {
        self.method.input()
    }

    /// The response message schema.
    pub fn output(&self) -> MessageDescriptor {
        self.method.output()
    }

    /// The HTTP/2 path of the method, see [`endpoint_path`].
    pub fn endpoint(&self) -> String {
        endpoint_path(&self.package, &self.service, self.name())
    }
}

/// Builds `/{package}.{service}/{procedure}`. Names are used verbatim.
pub fn endpoint_path(package: &str, service: &str, procedure: &str) -> String {
    format!("/{package}.{service}/{procedure}")
}

/// Resolves method names into [`Procedure`]s.
pub trait SchemaProvider {
    fn procedure(&self, name: &str) -> Result<Procedure, SchemaError>;
}

/// A registry that holds loaded Protobuf definitions and the service currently in use.
#[derive(Debug, Clone)]
pub struct DescriptorRegistry {
    pool: DescriptorPool,
    service: Option<ServiceDescriptor>,
}

impl DescriptorRegistry {
    /// Decodes a FileDescriptorSet directly from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SchemaError> {
        let pool = DescriptorPool::decode(bytes)?;
        Ok(Self::from_pool(pool))
    }

    /// Loads a FileDescriptorSet from a file on disk and builds the registry.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_pool(pool: DescriptorPool) -> Self {
        Self {
            pool,
            service: None,
        }
    }

    /// Lists every service of the pool by fully qualified name (e.g. `helloworld.Greeter`).
    pub fn services(&self) -> Vec<String> {
        self.pool
            .services()
            .map(|s| s.full_name().to_string())
            .collect()
    }

    /// Lists the methods of a service.
    pub fn methods(&self, service: &str) -> Result<Vec<MethodDescriptor>, SchemaError> {
        let service = self
            .pool
            .get_service_by_name(service)
            .ok_or_else(|| SchemaError::ServiceNotFound(service.to_string()))?;

        Ok(service.methods().collect())
    }

    /// Makes `service` (fully qualified) the one procedures are looked up in.
    pub fn select_service(&mut self, service: &str) -> Result<(), SchemaError> {
        let descriptor = self
            .pool
            .get_service_by_name(service)
            .ok_or_else(|| SchemaError::ServiceNotFound(service.to_string()))?;

        self.service = Some(descriptor);
        Ok(())
    }
}

impl SchemaProvider for DescriptorRegistry {
    fn procedure(&self, name: &str) -> Result<Procedure, SchemaError> {
        let service = self
            .service
            .as_ref()
            .ok_or(SchemaError::NoServiceSelected)?;

        let method = service
            .methods()
            .find(|m| m.name() == name)
            .ok_or_else(|| SchemaError::MethodNotFound(name.to_string()))?;

        if method.is_client_streaming() || method.is_server_streaming() {
            return Err(SchemaError::StreamingMethod(method.full_name().to_string()));
        }

        Ok(Procedure {
            package: service.package_name().to_string(),
            service: service.name().to_string(),
            method,
        })
    }
}
