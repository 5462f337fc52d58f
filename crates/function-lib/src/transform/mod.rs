//! Stateless per-batch transformers

mod scale;

pub use scale::MultiplyByFactor;
