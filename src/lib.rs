pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod jupiter;
pub mod llm;
pub mod market;
pub mod ports;
pub mod rpc;
pub mod server;
pub mod tokens;
pub mod tools;
pub mod tracker;
pub mod wallet;
