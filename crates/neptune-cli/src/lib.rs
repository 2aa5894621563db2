//! Library components of the Neptune console.

pub mod logging;
pub mod output;
pub mod settings;
