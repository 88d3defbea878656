//! Upload relay - accepts multipart file uploads and forwards them to a storage backend
//!
//! One storage strategy (CDN relay, S3-compatible blob storage or local disk) is
//! selected at startup; every uploaded file is handed to it and the resulting
//! locator is rendered back to the caller. A small arithmetic API rides along.

pub mod app;
pub mod calc;
pub mod error;
pub mod models;
pub mod storage;
pub mod views;
pub mod web;

pub use error::{Error, Result};
