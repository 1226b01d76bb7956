//! Lightweight query and document analysis
//!
//! Regex-based helpers that run before or alongside retrieval: contact
//! question detection and extraction, structured field parsing, and lexical
//! clause matching.

pub mod clause;
pub mod contact;
pub mod fields;

pub use clause::best_matching_clause;
pub use contact::{extract_contact_details, is_contact_question, ContactDetails};
pub use fields::{parse_query, ParsedQuery};
