pub mod args;
pub mod clock;
pub mod config;
pub mod crossword;
pub mod daily;
pub mod db;
pub mod error;
pub mod feedback;
pub mod logging;
pub mod pagination;
pub mod provider;
pub mod service;
pub mod session;
pub mod stats;
pub mod vocabulary;

pub use error::{GameError, GameResult};
