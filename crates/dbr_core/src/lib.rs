pub mod amount;
pub mod assemble;
pub mod classify;
pub mod domain;
pub mod error;
pub mod export;
pub mod extract;
pub mod patterns;
pub mod pipeline;
