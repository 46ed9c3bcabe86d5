//! Fetch the feeds listed in an OPML file and write a text or JSON digest.
//!
//! The pipeline is [`feed::parse`] -> [`feed::fetch_all`] ->
//! [`report::write_text`] / [`report::write_json`], driven by [`run::run`].

pub mod config;
pub mod feed;
pub mod report;
pub mod run;
pub mod util;
