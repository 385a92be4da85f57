// prelude.rs - Convenient re-exports for the common API surface.
//
//! # Prelude
//!
//! ```
//! use rescan::prelude::*;
//!
//! let re = Regex::new(r"\d+").unwrap();
//! let matches = re.search("answer: 42", true, 0).unwrap().unwrap();
//! assert_eq!(matches.matched(0), Some("42"));
//! ```

pub use crate::encoding::Encoding;
pub use crate::error::{Error, Result};
pub use crate::pattern::{Fragment, Options, Regex, RegexBuilder, Syntax};
pub use crate::print::MatchPrinter;
pub use crate::project::{GroupTable, MatchSet};
pub use crate::source::{TextElement, TextSource};
pub use crate::subst::{switch, Replacer, Template};
