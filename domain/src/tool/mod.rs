//! Tool domain module
//!
//! Tools are named callable capabilities the answer generator may invoke
//! mid-generation (e.g. `get_notice_details`). [`entities`] holds the
//! definition/registry/request types; [`value_objects`] holds the immutable
//! result and audit-trail types.

pub mod entities;
pub mod value_objects;
