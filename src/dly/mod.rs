//! Decoding of GHCN-d `.dly` files.

pub mod error;
pub mod line;
pub mod parser;
