use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use anyhow::{Context, Result};
use std::time::Duration;

/// HTTP provider for `rpc_url`.
///
/// No local fillers are installed: nonce, gas and the signature are left to
/// the node, which holds the account unlocked and answers
/// `eth_sendTransaction` itself.
pub fn connect_http(rpc_url: &str, poll_interval: Duration) -> Result<DynProvider> {
    let url = rpc_url
        .parse()
        .with_context(|| format!("Invalid RPC url '{}'", rpc_url))?;
    let client = RpcClient::new_http(url).with_poll_interval(poll_interval);

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_client(client)
        .erased())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_malformed_url() {
        assert!(connect_http("not a url", Duration::from_secs(1)).is_err());
        assert!(connect_http("http://127.0.0.1:8545", Duration::from_secs(1)).is_ok());
    }
}
