//! Client library for the citizen services portal.
//!
//! The remote REST service owns every application and profile. This crate mirrors that state
//! read-only, decides locally which actions a viewer may take, validates input before any
//! request leaves the process, and re-fetches after every successful mutation.

pub mod config;
pub mod error;
pub mod files;
pub mod gateway;
pub mod session;
pub mod telemetry;
pub mod workflows;

pub use url::Url;
