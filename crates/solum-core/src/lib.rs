pub mod assembly;
pub mod client;
pub mod component;
pub mod config;
pub mod error;
pub mod languagepack;
pub mod manager;
pub mod pipeline;
pub mod plan;
pub mod planfile;
pub mod resource;

#[cfg(test)]
mod testing;

pub use error::{Result, SolumError};
