//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: HTTP calls to the remote
//! service, terminal prompts, process signals, and filesystem access.
//!
//! Imports from `crate::domain` and `crate::application` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod confirm;
pub mod fs;
pub mod jsonapi;
pub mod remote;
pub mod signals;
