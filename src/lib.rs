//! A small relational table store with a SQL-like query language.
//!
//! [`executor::Executor`] is the entry point for front ends: it parses a
//! query string and runs it against its [`database::Database`].

pub mod database;
pub mod error;
pub mod executor;
pub mod gui;
pub mod query;
pub mod storage;
