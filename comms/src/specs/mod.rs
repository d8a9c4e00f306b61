//! The serde specifications shared between the nodes and the configuration files.

pub mod coordinator;
pub mod machine_learning;
