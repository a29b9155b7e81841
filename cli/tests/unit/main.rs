//! Unit tests for cloud-apply
//!
//! These tests use fake remote backends and run fast without network I/O.

mod apply_service;
