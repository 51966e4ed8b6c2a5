//! HTTP inbound adapter exposing REST endpoints.

pub mod catalog;
pub mod dto;
pub mod error;
pub mod financier;
pub mod government;
pub mod health;
pub mod params;
pub mod session;
pub mod state;
pub mod student;
#[cfg(test)]
pub mod test_utils;
pub mod wallet;

pub use error::ApiResult;
