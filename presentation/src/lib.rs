//! Presentation layer for consilium
//!
//! The clap CLI surface and a console presenter that renders the live
//! consultation transcript.

pub mod cli;
pub mod console;

pub use cli::Cli;
pub use console::ConsolePresenter;
