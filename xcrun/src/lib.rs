//! Exchange–correlation integration driver.
//!
//! Decodes the command line into a [`config::Configuration`], builds the
//! backend resources stage by stage, and releases everything it built at a
//! single teardown point.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod options;
