//! A client for the InfluxDB 2.x write API.
//!
//! The client covers a single use-case: submit one record at a time to the
//! `/api/v2/write` endpoint of a bucket, with second-level time precision.
//! Records carry no timestamp; the store assigns the write time on arrival.
#![forbid(unsafe_code)]

mod client;
mod error;
mod records;

pub use client::*;
pub use error::*;
pub use records::*;
