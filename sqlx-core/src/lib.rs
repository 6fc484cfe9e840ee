//! Core of sqlx-h2, the H2 database driver.
//! Not intended to be used directly.
#![warn(future_incompatible, rust_2018_idioms)]
#![allow(clippy::type_complexity)]
#![forbid(unsafe_code)]
//
// Allows an API be documented as only available in some specific platforms.
// <https://doc.rust-lang.org/unstable-book/language-features/doc-cfg.html>
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod logger;

pub mod error;

pub mod connection;
pub mod context;
pub mod driver;
pub mod h2;
pub mod net;

pub use sqlx_rt::test_block_on;
