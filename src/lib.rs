//! mediaforge: keyword-driven SEO articles and quality-checked images.

pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use app::api::ApiResponse;
pub use domain::AppError;
