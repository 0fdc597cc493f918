#![doc = include_str!("../README.md")]

pub mod cli;
pub mod engine;
pub mod error;
pub mod logging;
pub mod options;
pub mod runtime;
pub mod tools;
pub mod types;

mod selectors;

pub use engine::*;
pub use error::{Result, ScoutError};
pub use options::*;
pub use tools::fallback::{OpenAiGenerator, TextGenerator};
pub use types::*;
