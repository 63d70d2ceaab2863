pub mod chat;
mod callable;

pub use callable::*;
