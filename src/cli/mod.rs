//! # CLI Module
//!
//! Command-line front end for the advisor client. The binary builds the same
//! in-memory advisor page the library tests use, types the given values into
//! its `soil` and `region` inputs, submits the form and prints what ends up in
//! the `result` region.
//!
//! ## Commands
//!
//! ### `submit`
//!
//! One submission, fragment on stdout:
//!
//! ```bash
//! farmwise submit --soil Loamy --region North
//! ```
//!
//! ### `page`
//!
//! One submission, full HTML page (form plus result) on stdout:
//!
//! ```bash
//! farmwise page --soil Loamy --region North --output advisor.html
//! ```
//!
//! ### `interactive`
//!
//! One submission per `soil,region` line read from stdin:
//!
//! ```bash
//! printf 'Loamy,North\nClay,South\n' | farmwise interactive --output latest.html
//! ```
//!
//! Options shared by all commands:
//! - `--endpoint <URL>` - Advisor URL (default `http://127.0.0.1:5000/api/advisor`)
//! - `--timeout-ms <MS>` - Request timeout; none by default
//! - `--policy <POLICY>` - `latest-submission` or `last-resolved`
//!
//! An advisor that cannot be reached is not a CLI failure: the fallback fragment
//! is printed and the exit status is 0.

mod commands;


pub use commands::{parse_form_line, run, run_cli, Cli, Commands, EndpointArgs, FormArgs, PolicyArg};
