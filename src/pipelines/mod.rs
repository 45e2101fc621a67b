//! Workflow layer: thin facades that sequence the service components.

pub mod sign;
pub mod verify;

pub use sign::SignWorkflow;
pub use verify::VerifyWorkflow;
