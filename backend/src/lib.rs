//! # Course Scheduling Backend
//!
//! Spreadsheet ingestion and guideline conformance for course schedules.
//!
//! Uploaded spreadsheets are stored as onboarding revisions. A client maps the
//! sheet's columns to course fields; the pipeline then normalizes loosely
//! formatted cells (times, day letters, term codes), resolves building and
//! faculty references, validates every row and commits the whole batch in one
//! transaction. Committed courses are checked at query time against the
//! institution's scheduling guidelines.
//!
//! ## Architecture
//!
//! - [`api`]: identifier newtypes and the domain records shared by every layer
//! - [`models`]: text codecs (time, days, term, dates) and domain records
//! - [`ingest`]: sheet decoding, column mapping, resolution, validation, pipeline
//! - [`services`]: conformance matching and guideline search
//! - [`db`]: repository traits, local and Postgres backends, configuration
//! - [`http`]: Axum-based REST API (feature `http-server`)

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod ingest;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
