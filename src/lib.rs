//! Spotify to Harmony Music playlist converter library
//!
//! This library converts a Spotify playlist into a Harmony Music playlist
//! document by resolving every Spotify track against YouTube Music. It
//! includes modules for the Spotify and YouTube Music clients, the on-disk
//! caches and documents, the conversion pipeline and the CLI layer.
//!
//! # Modules
//!
//! - `cli` - Interactive command implementations and console output
//! - `config` - Configuration management and environment variables
//! - `management` - Token cache, destination playlist and failure log files
//! - `observer` - Progress and error events emitted by the pipeline
//! - `pipeline` - The conversion state machine
//! - `spotify` - Spotify Web API authentication and playlist retrieval
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `ytmusic` - YouTube Music search and track resolution
//!
//! # Example
//!
//! ```
//! use harmonize::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> harmonize::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     cli::convert(&config).await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod management;
pub mod observer;
pub mod pipeline;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod ytmusic;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the binary and configuration boundary where the concrete error
/// type does not matter to the caller. The component modules return their
/// own error enums.
///
/// # Example
///
/// ```
/// use harmonize::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching tracks from Spotify...");
/// info!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Loaded Harmony template: {}", path.display());
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the process with exit code 1 right after printing. Only use it
/// for fatal conditions where no output should be written anymore.
///
/// # Example
///
/// ```
/// error!("Spotify authentication failed: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues such as a corrupt token cache, a failed page
/// request or a track that could not be found.
///
/// # Example
///
/// ```
/// warning!("Token cache unreadable, requesting a new token");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
