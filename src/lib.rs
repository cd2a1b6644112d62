//! `boostme` - challenge catalog and client directory library
//!
//! This crate provides the core functionality for the `boostme` CLI tool:
//! a parameterized query executor over a pooled `SQLite` store, with
//! accessors for a weekly-challenge catalog and a client directory.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Row, Value, Challenge, Client)
//! - [`storage`] - Connection pool, query executor and accessors
//! - [`config`] - Layered configuration
//! - [`error`] - Error types and handling
//! - [`format`] - Output formatting (text, JSON envelopes)
//! - [`validation`] - Input checks applied before writes

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod storage;
pub mod validation;

pub use error::{BoostError, ErrorCode, Result, StructuredError};
pub use storage::{QueryExecutor, RowSet, Storage};
