//! Review domain module
//!
//! The reviewer is an independent model invocation that scores a draft
//! answer. Its free-text output is parsed into a typed [`verdict::ReviewVerdict`]
//! by [`parsing::parse_review_verdict`].

pub mod parsing;
pub mod verdict;
