//! Cross-crate flows: adapter, agent bus, and types together.

pub mod fixtures;

#[cfg(test)]
mod batch_flows;
#[cfg(test)]
mod session_flows;
