//! # rescan
//!
//! An encoding-aware text search toolkit built around the
//! [`regex`](https://crates.io/crates/regex) engine. The engine does the
//! matching; rescan does everything around it: encoding resolution,
//! pattern composition, string/file/stream text sources with incremental
//! reads, match tables with both byte and character offsets,
//! back-reference substitution, and terminal match rendering.
//!
//! ## Quick Start
//!
//! ```rust
//! use rescan::prelude::*;
//!
//! let re = Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap();
//! let matches = re.search("Date: 2026-02-12", true, 0).unwrap().unwrap();
//! assert_eq!(matches.matched(0), Some("2026-02-12"));
//! assert_eq!(matches.byte_offsets(), &[6]);
//! ```
//!
//! For fine-grained control, use [`RegexBuilder`]:
//!
//! ```rust
//! use rescan::prelude::*;
//!
//! let re = Regex::builder("hello")
//!     .case_insensitive(true)
//!     .build()
//!     .unwrap();
//! assert!(re.search("Hello World", false, 0).unwrap().is_some());
//! ```
//!
//! Substitution understands `\N` and `\k<name>` back-references:
//!
//! ```rust
//! use rescan::prelude::*;
//!
//! let re = Regex::new(r"(\w+) (\w+)").unwrap();
//! assert_eq!(re.substitute("hello world", r"\2-\1", true).unwrap(), "world-hello");
//! ```
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`encoding`] | Encoding descriptors, resolution and stepping |
//! | [`pattern`] | Pattern compilation and composition |
//! | [`source`] | String, file and stream text sources |
//! | [`search`] | The match engine driver and raw match tables |
//! | [`project`] | User-facing match and group projections |
//! | [`subst`] | Split, substitute and switch |
//! | [`print`] | Terminal match rendering |

pub mod encoding;
pub mod error;
pub mod pattern;
pub mod prelude;
pub mod print;
pub mod project;
pub mod search;
pub mod source;
pub mod subst;

pub use crate::encoding::Encoding;
pub use crate::error::{Error, Result};
pub use crate::pattern::{Fragment, Options, Regex, RegexBuilder, Syntax};
pub use crate::print::MatchPrinter;
pub use crate::project::{GroupTable, MatchSet};
pub use crate::search::{RawMatchSet, RawRegion};
pub use crate::source::{TextElement, TextSource};
pub use crate::subst::{switch, Replacer, Template};
