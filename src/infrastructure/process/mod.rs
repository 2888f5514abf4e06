//! External program adapters

mod tokio_runner;

#[cfg(test)]
pub(crate) mod testing;

pub use tokio_runner::TokioCommandRunner;
