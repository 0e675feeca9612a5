//! Acknowledgment lane for received messages
//!
//! Once a retrieved message has been handled, the relay expects an
//! M-NotifyResp.ind and, when it asked for one, an M-Acknowledge.ind. This crate
//! builds those tasks, resolves the network route for each send and pushes them
//! through a single serialized worker.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod route;
pub mod tasks;
pub mod transport;

pub use config::{AckConfig, HttpTimeouts};
pub use dispatcher::{AckDispatcher, AckSender, AckSubmitter};
pub use error::{AckError, NetworkError, RouteError, TransportError};
pub use route::{
    CredentialSource, NetworkPolicy, ProxyAddress, RelayCredentials, RouteParameters,
    RouteResolver, StaticNetworkPolicy,
};
pub use tasks::{AckAttempt, AckTask, TaskInput, build_ack_tasks};
pub use transport::{HttpRequest, HttpTransport, Transport, TransportResponse};
