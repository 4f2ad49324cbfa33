//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Gate every record operation behind the access guard.

pub mod record_service;
