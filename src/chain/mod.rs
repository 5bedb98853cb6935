pub mod connector;
pub mod contracts;
pub mod gateway;
pub mod provider;
pub mod utils;

// Re-export commonly used items
pub use connector::{JsonRpcConnector, WalletConnector};
pub use contracts::ContractCall;
pub use gateway::{
    CallFailure, CallHandle, CallStatus, ContractGateway, GatewaySettings, JsonRpcGateway,
    TransactionBackend,
};
pub use provider::connect_http;
