//! Built-in providers

pub mod bitbucket;
