pub mod config;
pub mod errors;
pub mod filters;
pub mod models;
pub mod priority;
pub mod repo;
pub mod scheduler;
pub mod selection;
pub mod session;
pub mod stats;

pub use config::*;
pub use errors::*;
pub use filters::*;
pub use models::*;
pub use priority::*;
pub use repo::*;
pub use scheduler::*;
pub use selection::*;
pub use session::*;
pub use stats::*;
