pub mod detection;
pub mod discovery;
pub mod pipeline;
pub mod recognition;
pub mod shared;
