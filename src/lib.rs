//! Works out which revision of each downloadable data file a client should
//! fetch next.
//!
//! [`manifest::parse_manifest`] turns the server document into a validated
//! [`manifest::Manifest`]; [`resolver::resolve`] combines it with the client's
//! state into a [`resolver::DownloadPlan`]. Both are pure. The remaining modules
//! supply the state and the document for the command-line driver.

pub mod env;
pub mod fetch;
pub mod manifest;
pub mod resolver;
pub mod storage;
pub mod updater;
pub mod version;
