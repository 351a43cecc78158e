//! CLI command implementations.

pub mod publish;

pub use publish::PublishArgs;
