//! Output formatters for comparison results.
//!
//! - Plain text for people
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::duplicates::DuplicateFinder;
//! use crossdupe::error::ExitCode;
//! use crossdupe::output::{JsonOutput, TextOutput};
//! use crossdupe::scanner::WalkerConfig;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (matches, summary) =
//!     finder.find_duplicates(WalkerConfig::new("master"), WalkerConfig::new("slave"));
//!
//! print!("{}", TextOutput::new(&matches, &summary).render());
//!
//! let output = JsonOutput::new(&matches, &summary, ExitCode::from_summary(&summary));
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
