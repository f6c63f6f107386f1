pub mod extraction_service;
pub mod header_date;
pub mod mock;
pub mod normalization;
pub mod prompt;

pub use extraction_service::{ExtractionService, OrderExtractor};
pub use mock::{MockExtractor, MockResponse};
