pub mod algorithm;
pub mod config;
pub mod corpus;
pub mod error;
pub mod input;
pub mod output;
pub mod validate;
