//! Process runtime helpers.

pub mod shutdown;
