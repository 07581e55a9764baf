//! Quick-search module - pure matching primitives, no I/O and no stored state
//!
//! Architecture principles:
//! - The module only exposes primitive operations: escape, term_matches,
//!   Query::parse/matches, search
//! - Callers own the collections; every invocation recomputes from scratch
//! - Call direction: API layer → search (unidirectional)
//!
//! Matching semantics:
//! - Terms are literal substrings, case-insensitive, no diacritic folding
//! - A query is split into terms on the literal `%20` delimiter; a haystack
//!   must contain every term (AND), in any order
//! - An empty or whitespace-only query means "no active search" and is
//!   represented as absent results, distinct from "matched nothing"

pub mod filter;
pub mod matcher;
pub mod query;

pub use filter::{search, SearchResults};
pub use matcher::{escape, term_matches};
pub use query::{matches, Query};
