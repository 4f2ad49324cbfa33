//! Record access-control contracts.
//!
//! This module defines the declaration-time access table shipped with the
//! module and the runtime guard that enforces it before every record
//! operation. Group membership management is out of scope; callers name
//! the acting group directly.

pub mod access;
