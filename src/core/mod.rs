// src/core/mod.rs

//! Pure, process-free logic: turning commands into argument vectors and
//! accumulating captured text.

pub mod command_splitter;
pub mod output;
