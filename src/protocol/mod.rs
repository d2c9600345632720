pub mod error;
pub mod jsonrpc;

pub use error::{Result, RpcError};
pub use jsonrpc::{JsonRpcRequest, RequestId};
