//! wasmbind CLI library.
//!
//! Exposes the command implementations and output formatters so they can be
//! tested without spawning the binary.

#![allow(clippy::format_push_string)]

pub mod commands;
pub mod formatters;
