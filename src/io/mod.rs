//! Result serialization for downstream reporting.

pub mod export;
