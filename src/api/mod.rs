//! API client module for the IMIS client.
//!
//! Provides the HTTP client with bearer token injection, one module of
//! endpoint functions per backend resource, and the request/response types
//! matching the IMIS backend API.

pub mod auth;
pub mod client;
pub mod doctor;
pub mod incidents;
pub mod labtests;
pub mod patients;
pub mod stats;
pub mod types;
