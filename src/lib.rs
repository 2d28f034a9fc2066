pub mod cli;
pub mod config;
pub mod contract;
pub mod download;
pub mod error;
pub mod feeds;
pub mod load_config;
pub mod publish;
pub mod storage;
pub mod synchronise;
pub mod upload;

pub use cli::{run, Cli, Commands};
