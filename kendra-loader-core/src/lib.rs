#![doc = "kendra-loader-core: core logic library for kendra-loader."]

//! This crate holds the document pipeline and search tooling with no cloud
//! vendor code: every remote effect goes through the traits in [`contract`].
//!
//! # Passes
//! - [`prepare::prepare`]: crawled JSON → `X.txt` + `X.txt.metadata.json`
//! - [`upload::upload`]: directory → object store, bounded worker pool
//! - [`clean::clean`]: remove the working files
//!
//! # Query tooling
//! - [`query::send_simple_query`] and the CSV harness in [`test_case`].

pub mod clean;
pub mod config;
pub mod contract;
pub mod error;
pub mod listing;
pub mod normalize;
pub mod prepare;
pub mod query;
pub mod test_case;
pub mod upload;

pub use error::{FileFailure, LoaderError};
