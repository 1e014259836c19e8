//! Turn persistence adapters

pub mod jsonl_store;

pub use jsonl_store::JsonlTurnStore;
