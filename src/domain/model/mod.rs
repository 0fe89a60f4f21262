//! Protocol-stable model types shared across layers.

mod algorithm;

pub use algorithm::Algorithm;
