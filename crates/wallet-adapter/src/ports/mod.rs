//! Ports: the Wallet interface offered to applications and the agent
//! interface the adapter depends on.

pub mod inbound;
pub mod outbound;

pub use inbound::Wallet;
pub use outbound::{AgentClient, AgentConnector, AgentError, MockAgent, MockConnector};
