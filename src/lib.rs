//! Mirrors the data.cms.gov open-data catalog to a local directory.
//!
//! For every dataset of the catalog only the most recently published distributions are
//! fetched. Files that already exist locally are skipped, so an interrupted run can simply be
//! started again.

pub mod config;
pub mod download;
pub mod error;
pub mod latest;
pub mod model;
pub mod progress;
pub mod router;
pub mod service;
pub mod stats;
pub mod table;
pub mod temporal;
