//! QRSU - QR code and short URL service
//!
//! This library provides the core functionality for the QRSU service:
//! URL validation (syntax, public suffix, threat reputation), short-link
//! issuance backed by a pluggable document store, and QR rendering to
//! PNG/JPEG/SVG.
//!
//! # Architecture
//! - `services`: validator, reputation lookup, shortener, QR renderer and
//!   the HTTP handlers built on them
//! - `storages`: storage backends and data access
//! - `config`: configuration management
//! - `errors`: crate-wide error type
//! - `system`: logging initialization
//! - `utils`: short-code generation

pub mod config;
pub mod errors;
pub mod services;
pub mod storages;
pub mod system;
pub mod utils;
