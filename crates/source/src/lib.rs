#![forbid(unsafe_code)]

pub mod http;
pub mod json;
pub mod provider;

pub use http::HttpSource;
pub use json::JsonFileSource;
pub use provider::{ChoiceRecord, InMemorySource, LoadError, QuestionRecord, QuestionSource};
