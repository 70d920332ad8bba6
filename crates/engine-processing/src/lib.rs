pub mod batch;
pub mod coordinator;
pub mod error;
pub mod summary;
pub mod transform;

#[cfg(test)]
mod tests;
