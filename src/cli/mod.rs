//! # CLI Module
//!
//! The user-facing layer of harmonize. It asks for the playlist to convert
//! and the Harmony Music template to fill, wires the production clients into
//! a [`crate::pipeline::Converter`] and renders the pipeline's events on the
//! terminal.
//!
//! ## Commands
//!
//! - [`convert`] - Interactive conversion of one Spotify playlist
//!
//! ## Output
//!
//! [`ConsoleObserver`] turns progress and error events into the coloured
//! `info!`/`success!`/`warning!` lines used throughout the crate, shows a
//! progress bar while tracks are searched and prints a table of the tracks
//! that could not be found. Fatal errors go through `error!`, which exits
//! with status 1 before any output file is written.
//!
//! ## Usage
//!
//! ```bash
//! harmonize                 # convert a playlist
//! harmonize completions zsh # print shell completions
//! ```

mod console;
mod convert;

pub use console::ConsoleObserver;
pub use convert::convert;
