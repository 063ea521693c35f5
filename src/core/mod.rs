pub mod error;
pub mod monitor;
pub mod process;
pub mod sampler;
pub mod scheduler;
pub mod snapshot;
pub mod source;

#[cfg(test)]
pub mod testing;
