pub mod builder;
pub mod error;
pub mod fields;
pub mod validation;

pub use builder::{BuildContext, build_event};
pub use error::Ineligible;
