pub mod accession;
pub mod app;
pub mod chunk;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod output;
pub mod payload;
pub mod upload;
