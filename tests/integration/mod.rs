//! Merge behavior through the public API.

mod brace_balance;
mod header_balance;
mod scenarios;
