//! RFC 9457 problem details shared by every REST module.

pub mod problem;
