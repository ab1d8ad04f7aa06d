pub mod infer;

pub use infer::{InferConfig, infer_queries};
