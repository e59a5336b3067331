mod http;

pub use http::{HttpValidatorClient, HttpValidatorClientFactory};
