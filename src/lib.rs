//! A single command-line call as a value.
//!
//! [`Invocation`] captures the script name, the options (raw or parsed
//! getopt-style against a short/long pattern), environment lookup, and
//! standard input drained lazily on first use.
//!
//! ```no_run
//! use callinfo::Invocation;
//!
//! let call = Invocation::new(Some("a:h"), Some(&["all::"][..])).unwrap();
//! if let Some(a) = call.opt_str("a") {
//!     println!("{} got -a {}", call.name(), a);
//! }
//! ```

pub mod config;
pub mod invocation;
pub mod logging;
pub mod report;

pub use invocation::{Invocation, InvocationBuilder, InvocationError, OptKey, OptRef, OptValue, OptionStore};
