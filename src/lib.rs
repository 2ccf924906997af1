//! Linkmark - share-link resolution for a bookmarking service
//!
//! This library implements the short-code subsystem of the Linkmark app:
//! minting share codes for resources and collection folders, resolving them
//! under the sharing access policy, and counting resource views.
//!
//! # Architecture
//! - `policy`: pure access-policy evaluator (allow / deny / require-auth)
//! - `services`: HTTP handlers (resolution, share creation, health)
//! - `storages`: storage trait and backends (Sea-ORM, in-memory)
//! - `middleware`: requester-identity extraction from bearer tokens
//! - `config`: environment-based configuration
//! - `system`: logging and process-level utilities

pub mod config;
pub mod errors;
pub mod middleware;
pub mod policy;
pub mod services;
pub mod storages;
pub mod structs;
pub mod system;
pub mod utils;
