// HTTP access layer

pub mod client;

pub use client::ApiClient;
