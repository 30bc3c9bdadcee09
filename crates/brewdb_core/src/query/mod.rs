//! Query filters: parsing and predicate evaluation.
//!
//! A filter arrives as a [`Value`](brewdb_codec::Value) tree of field names
//! mapping to literals, operator objects, or `$or` groups, and is parsed
//! once into an AST. All validation (operator names, operand shapes, regex
//! compilation) happens at parse time, so evaluation against records is a
//! pure, infallible predicate.

mod eval;
mod filter;

pub use filter::Filter;
