pub mod message;
pub mod preferences;
pub mod stored;
pub mod event;
pub mod config;
pub mod error;


pub use error::{ChatError, MysteryError};
pub type Result<T> = std::result::Result<T, MysteryError>;
