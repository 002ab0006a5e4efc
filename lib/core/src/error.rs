//! Shared result type.
//!
//! Verifier, authority client, and store all return `Report<C>` where `C` is
//! the error enum of their own crate. When a lower layer's report crosses into
//! a higher one it is wrapped with `.context()`, so the HTTP layer sees the
//! outer enum through `current_context()` and the log line keeps the chain.

use rootcause::Report;

/// `Result` whose error is a report with current context `C`.
pub type Result<T, C> = std::result::Result<T, Report<C>>;
