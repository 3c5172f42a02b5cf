pub mod api;
pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod policy;
pub mod tickets;

pub use self::{config::Config, error::Error};
