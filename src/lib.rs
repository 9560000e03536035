//! Pixel Pet dashboard core.
//!
//! [`services::task_aggregator`] turns a task snapshot into the dashboard
//! views; the rest of the crate fetches that snapshot from the gateway and
//! presents the result.

pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{ApiError, ApiResult};
