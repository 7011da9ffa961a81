//! Wire models for the TaskBoard service, split by resource.

pub mod common;
pub mod task;
pub mod user;

pub use common::*;
pub use task::*;
pub use user::*;
