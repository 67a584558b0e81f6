//! Directory daemon control plane: lifecycle supervision + socket dispatch.

mod error;
pub mod client;
pub mod dispatch;
pub mod lifecycle;
pub mod paths;
pub mod pidfile;
mod runtime;
pub mod services;
pub mod store;

pub use error::DaemonError;
pub use runtime::{run, start_blocking};
