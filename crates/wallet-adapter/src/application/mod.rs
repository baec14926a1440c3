//! Application layer: session lifecycle, dispatch, and the Wallet service.

pub mod batch;
pub mod calls;
pub mod dispatcher;
pub mod service;
pub mod session;

pub use batch::BatchDispatcher;
pub use calls::{MethodCall, MethodResult, NamedCall};
pub use dispatcher::OperationDispatcher;
pub use service::WalletAdapter;
pub use session::SessionManager;
