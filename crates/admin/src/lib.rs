//! Clothesline back-office library.
//!
//! Catalog editing, order fulfilment, customer lookup and contact form
//! triage. Exposed as a library so the CLI can reuse the repositories and
//! password hashing.
//!
//! # Security
//!
//! This crate writes to the shared shop database and manages admin
//! accounts. Bind it to a private interface.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
