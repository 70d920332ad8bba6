pub mod source;
pub mod utils;
