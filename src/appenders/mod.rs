//! Appender implementations

pub mod console;
pub mod memory;
pub mod rotating_file;

pub use console::ConsoleAppender;
pub use memory::MemoryAppender;
pub use rotating_file::{RotatingFileAppender, RotationPolicy, RotationStrategy};

pub use crate::core::Appender;
