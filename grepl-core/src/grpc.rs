//! # gRPC Transport
//!
//! The `tonic` implementation of [`crate::call::Transport`].
//!
//! Unlike standard `tonic` clients which are strongly typed (e.g., `HelloRequest`),
//! the components here exchange `prost_reflect::DynamicMessage`s whose layout is only known at
//! runtime, through the descriptors of the method being called.
pub mod client;
pub mod codec;
