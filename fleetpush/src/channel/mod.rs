//! Channel layer for prompt matching over an interactive PTY.
//!
//! Handles reading device output until a prompt appears, with ANSI
//! stripping and tail-only pattern search.

mod buffer;
mod patterns;
mod pty;

pub use buffer::PatternBuffer;
pub use patterns::{combine_prompt_patterns, compile_prompt_pattern};
pub use pty::PtyChannel;
