pub mod client;
pub mod context;
pub mod error;
pub mod model;

pub use context::RequestCtx;
pub use error::CalendarError;
pub use model::*;
