//! # Grepl Core
//!
//! `grepl-core` is the library behind the `grepl` CLI. It builds gRPC requests interactively:
//! given the schema of a method's input message, it asks a human for one value per field,
//! turns those answers into a typed message and sends it to the server.
//!
//! ## Key Components
//!
//! * **[`schema`]:** A self-contained description of a message (fields, kinds, oneofs and enums),
//!   converted from `prost-reflect` descriptors.
//! * **[`coerce`]:** The table that turns raw text into a typed value for every scalar kind.
//! * **[`walker`] & [`resolver`]:** Walk a schema depth-first, prompting for scalars and letting the
//!   user pick oneof alternatives and enum values.
//! * **[`assembler`]:** Turns the collected answers into a [`message::TypedMessage`].
//! * **[`call::Session`]:** The entry point. It resolves a method, drives the collection, invokes the
//!   transport and formats the response.
//!
//! ## Collaborators
//!
//! The terminal front end and the network layer are abstracted behind traits
//! ([`source::PromptSource`], [`source::ChoiceSource`], [`call::Transport`]) so the engine can be
//! driven by scripted input in tests. [`grpc::client::GrpcTransport`] is the `tonic` implementation
//! used by the CLI.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost`, `prost-reflect`, and `tonic` to ensure that consumers
//! use compatible versions of these underlying dependencies.
pub mod assembler;
pub mod call;
pub mod coerce;
pub mod grpc;
pub mod message;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod walker;

// Re-exports
pub use prost;
pub use prost_reflect;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
