//! Submission of contract calls and tracking of their outcome.
//!
//! Every submitted call gets its own [`CallHandle`]; the caller awaits the
//! handle instead of listening on a shared notification stream.
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{
    DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider, WatchTxError,
};
use alloy::rpc::json_rpc::ErrorPayload;
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportError;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::chain::contracts::ContractCall;
use crate::entity::FarmError;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Why a call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallFailure {
    #[error("rejected by signer: {0}")]
    Rejected(String),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("transaction {0} was not mined in time")]
    Dropped(TxHash),

    #[error("{0}")]
    Gateway(String),
}

impl From<CallFailure> for FarmError {
    fn from(failure: CallFailure) -> Self {
        match failure {
            CallFailure::Rejected(reason) => FarmError::CallRejected(reason),
            CallFailure::Reverted(tx_hash) => FarmError::CallReverted(tx_hash.to_string()),
            CallFailure::Dropped(tx_hash) => {
                FarmError::Rpc(format!("transaction {} was not mined in time", tx_hash))
            }
            CallFailure::Gateway(reason) => FarmError::Rpc(reason),
        }
    }
}

/// Progress of a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Signing,
    Mining { tx_hash: TxHash },
    Success { tx_hash: TxHash },
    Failed(CallFailure),
}

/// Caller's view of one submitted call.
pub struct CallHandle {
    label: String,
    status: watch::Receiver<CallStatus>,
}

impl CallHandle {
    pub fn new(label: impl Into<String>, status: watch::Receiver<CallStatus>) -> Self {
        Self {
            label: label.into(),
            status,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn status(&self) -> CallStatus {
        self.status.borrow().clone()
    }

    /// Resolves once the call succeeded or failed.
    pub async fn settled(mut self) -> Result<TxHash, CallFailure> {
        loop {
            let current = self.status.borrow_and_update().clone();
            match current {
                CallStatus::Success { tx_hash } => return Ok(tx_hash),
                CallStatus::Failed(failure) => return Err(failure),
                CallStatus::Signing | CallStatus::Mining { .. } => {}
            }

            if self.status.changed().await.is_err() {
                let last = self.status.borrow().clone();
                return match last {
                    CallStatus::Success { tx_hash } => Ok(tx_hash),
                    CallStatus::Failed(failure) => Err(failure),
                    _ => Err(CallFailure::Gateway(format!(
                        "'{}' was abandoned before completion",
                        self.label
                    ))),
                };
            }
        }
    }
}

/// Accepts contract calls and reports their progress per call.
pub trait ContractGateway: Send + Sync {
    /// Submit `call` under `label`. Returns immediately; progress is
    /// observed through the returned handle.
    fn submit(&self, label: &str, call: ContractCall) -> CallHandle;
}

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub confirmations: u64,
    pub poll_interval: Duration,
    pub receipt_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            confirmations: 1,
            poll_interval: Duration::from_secs(1),
            receipt_timeout: Duration::from_secs(300),
        }
    }
}

/// The two node operations a call goes through.
#[async_trait]
pub trait TransactionBackend: Send + Sync {
    /// Hands `request` to the node for signing and broadcast.
    async fn broadcast(&self, request: TransactionRequest) -> Result<TxHash, TransportError>;

    /// Waits until `tx_hash` is `confirmations` blocks deep and returns the
    /// receipt status.
    async fn confirm(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<bool, PendingTransactionError>;
}

#[async_trait]
impl TransactionBackend for DynProvider {
    async fn broadcast(&self, request: TransactionRequest) -> Result<TxHash, TransportError> {
        let pending = self.send_transaction(request).await?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
        timeout: Duration,
    ) -> Result<bool, PendingTransactionError> {
        let receipt = PendingTransactionBuilder::new(self.root().clone(), tx_hash)
            .with_required_confirmations(confirmations)
            .with_timeout(Some(timeout))
            .get_receipt()
            .await?;

        Ok(receipt.status())
    }
}

/// Gateway that signs through the node's unlocked account
/// (`eth_sendTransaction`) and waits for the receipt.
pub struct JsonRpcGateway {
    backend: Arc<dyn TransactionBackend>,
    from: Address,
    settings: GatewaySettings,
}

impl JsonRpcGateway {
    pub fn new(
        backend: Arc<dyn TransactionBackend>,
        from: Address,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            backend,
            from,
            settings,
        }
    }

    async fn drive(
        backend: Arc<dyn TransactionBackend>,
        from: Address,
        settings: GatewaySettings,
        label: String,
        call: ContractCall,
        status_tx: watch::Sender<CallStatus>,
    ) {
        let request = TransactionRequest::default()
            .from(from)
            .to(call.contract)
            .input(call.data.clone().into());

        let tx_hash = match backend.broadcast(request).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                warn!("'{}' ({}) was not broadcast: {}", label, call.function, e);
                let _ = status_tx.send(CallStatus::Failed(broadcast_failure(&e)));
                return;
            }
        };

        info!("'{}' broadcast as {}", label, tx_hash);
        let _ = status_tx.send(CallStatus::Mining { tx_hash });

        let outcome = match backend
            .confirm(tx_hash, settings.confirmations, settings.receipt_timeout)
            .await
        {
            Ok(true) => CallStatus::Success { tx_hash },
            Ok(false) => CallStatus::Failed(CallFailure::Reverted(tx_hash)),
            Err(PendingTransactionError::TxWatcher(WatchTxError::Timeout)) => {
                CallStatus::Failed(CallFailure::Dropped(tx_hash))
            }
            Err(e) => CallStatus::Failed(CallFailure::Gateway(format!(
                "waiting for {} failed: {}",
                tx_hash, e
            ))),
        };

        match &outcome {
            CallStatus::Success { .. } => info!("'{}' confirmed ({})", label, tx_hash),
            CallStatus::Failed(failure) => warn!("'{}' failed: {}", label, failure),
            _ => {}
        }
        let _ = status_tx.send(outcome);
    }
}

fn broadcast_failure(error: &TransportError) -> CallFailure {
    match error.as_error_resp() {
        Some(payload) if is_user_rejection(payload) => {
            CallFailure::Rejected(payload.message.to_string())
        }
        _ => CallFailure::Gateway(error.to_string()),
    }
}

/// The signer declined the request.
fn is_user_rejection(payload: &ErrorPayload) -> bool {
    let message = payload.message.to_lowercase();
    payload.code == USER_REJECTED_CODE
        || message.contains("user denied")
        || message.contains("user rejected")
}

impl ContractGateway for JsonRpcGateway {
    fn submit(&self, label: &str, call: ContractCall) -> CallHandle {
        let (status_tx, status_rx) = watch::channel(CallStatus::Signing);

        tokio::spawn(Self::drive(
            self.backend.clone(),
            self.from,
            self.settings.clone(),
            label.to_string(),
            call,
            status_tx,
        ));

        CallHandle::new(label, status_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, U256};
    use alloy::providers::ProviderBuilder;
    use alloy::transports::mock::Asserter;
    use std::sync::Mutex;

    fn token() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn approve_call() -> ContractCall {
        ContractCall::approve(token(), Address::repeat_byte(0xfa), U256::from(10u64))
    }

    fn settings() -> GatewaySettings {
        GatewaySettings {
            confirmations: 3,
            poll_interval: Duration::from_millis(10),
            receipt_timeout: Duration::from_secs(5),
        }
    }

    fn mocked_provider(asserter: &Asserter) -> DynProvider {
        ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone())
            .erased()
    }

    /// Backend whose broadcast and confirmation outcomes are fixed up front.
    struct ScriptedBackend {
        tx_hash: TxHash,
        confirmation: fn() -> Result<bool, PendingTransactionError>,
        broadcasts: Mutex<Vec<TransactionRequest>>,
        waits: Mutex<Vec<(TxHash, u64, Duration)>>,
    }

    impl ScriptedBackend {
        fn new(confirmation: fn() -> Result<bool, PendingTransactionError>) -> Self {
            Self {
                tx_hash: TxHash::repeat_byte(0x0e),
                confirmation,
                broadcasts: Mutex::new(Vec::new()),
                waits: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TransactionBackend for ScriptedBackend {
        async fn broadcast(&self, request: TransactionRequest) -> Result<TxHash, TransportError> {
            self.broadcasts.lock().unwrap().push(request);
            Ok(self.tx_hash)
        }

        async fn confirm(
            &self,
            tx_hash: TxHash,
            confirmations: u64,
            timeout: Duration,
        ) -> Result<bool, PendingTransactionError> {
            self.waits
                .lock()
                .unwrap()
                .push((tx_hash, confirmations, timeout));
            (self.confirmation)()
        }
    }

    fn scripted_gateway(backend: &Arc<ScriptedBackend>) -> JsonRpcGateway {
        JsonRpcGateway::new(backend.clone(), Address::repeat_byte(0x01), settings())
    }

    #[tokio::test]
    async fn handle_resolves_on_success() {
        let (tx, rx) = watch::channel(CallStatus::Signing);
        let handle = CallHandle::new("Approve ERC20 Transfer", rx);
        assert_eq!(handle.label(), "Approve ERC20 Transfer");

        let tx_hash = TxHash::repeat_byte(0x01);
        let waiter = tokio::spawn(handle.settled());

        tx.send(CallStatus::Mining { tx_hash }).unwrap();
        tx.send(CallStatus::Success { tx_hash }).unwrap();

        assert_eq!(waiter.await.unwrap(), Ok(tx_hash));
    }

    #[tokio::test]
    async fn handle_reports_failure() {
        let (tx, rx) = watch::channel(CallStatus::Signing);
        let handle = CallHandle::new("Stake Tokens", rx);

        tx.send(CallStatus::Failed(CallFailure::Rejected("denied".into())))
            .unwrap();

        assert_eq!(
            handle.settled().await,
            Err(CallFailure::Rejected("denied".into()))
        );
    }

    #[tokio::test]
    async fn dropped_sender_fails_the_call() {
        let (tx, rx) = watch::channel(CallStatus::Signing);
        let handle = CallHandle::new("Stake Tokens", rx);
        drop(tx);

        assert!(matches!(
            handle.settled().await,
            Err(CallFailure::Gateway(_))
        ));
    }

    #[tokio::test]
    async fn terminal_value_survives_sender_drop() {
        let (tx, rx) = watch::channel(CallStatus::Signing);
        let handle = CallHandle::new("Stake Tokens", rx);
        let tx_hash = TxHash::repeat_byte(0x02);
        tx.send(CallStatus::Success { tx_hash }).unwrap();
        drop(tx);

        assert_eq!(handle.settled().await, Ok(tx_hash));
    }

    #[test]
    fn failures_convert_to_farm_errors() {
        let rejected: FarmError = CallFailure::Rejected("no".into()).into();
        assert!(matches!(rejected, FarmError::CallRejected(_)));

        let reverted: FarmError = CallFailure::Reverted(TxHash::ZERO).into();
        assert!(matches!(reverted, FarmError::CallReverted(_)));
    }

    #[tokio::test]
    async fn signer_refusal_is_rejected() {
        let asserter = Asserter::new();
        asserter.push_failure(ErrorPayload {
            code: USER_REJECTED_CODE,
            message: "User denied transaction signature".into(),
            data: None,
        });
        let gateway = JsonRpcGateway::new(
            Arc::new(mocked_provider(&asserter)),
            Address::repeat_byte(0x01),
            settings(),
        );

        let handle = gateway.submit("Approve ERC20 Transfer", approve_call());

        assert_eq!(
            handle.settled().await,
            Err(CallFailure::Rejected(
                "User denied transaction signature".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn other_node_errors_are_gateway_failures() {
        let asserter = Asserter::new();
        asserter.push_failure(ErrorPayload {
            code: -32000,
            message: "replacement transaction rejected: nonce too low".into(),
            data: None,
        });
        let gateway = JsonRpcGateway::new(
            Arc::new(mocked_provider(&asserter)),
            Address::repeat_byte(0x01),
            settings(),
        );

        let handle = gateway.submit("Stake Tokens", approve_call());

        assert!(matches!(
            handle.settled().await,
            Err(CallFailure::Gateway(message)) if message.contains("nonce too low")
        ));
    }

    #[tokio::test]
    async fn malformed_transaction_hash_is_a_gateway_failure() {
        let asserter = Asserter::new();
        asserter.push_success(&"0xnot-a-hash");
        let gateway = JsonRpcGateway::new(
            Arc::new(mocked_provider(&asserter)),
            Address::repeat_byte(0x01),
            settings(),
        );

        let handle = gateway.submit("Approve ERC20 Transfer", approve_call());

        assert!(matches!(
            handle.settled().await,
            Err(CallFailure::Gateway(_))
        ));
    }

    #[tokio::test]
    async fn provider_returns_the_broadcast_hash() {
        let asserter = Asserter::new();
        let tx_hash = TxHash::repeat_byte(0x5a);
        asserter.push_success(&tx_hash);
        let provider = mocked_provider(&asserter);

        let request = TransactionRequest::default()
            .from(Address::repeat_byte(0x01))
            .to(token())
            .input(Bytes::from(vec![0x09, 0x5e, 0xa7, 0xb3]).into());

        assert_eq!(provider.broadcast(request).await.unwrap(), tx_hash);
    }

    #[tokio::test]
    async fn waits_for_the_configured_depth() {
        let backend = Arc::new(ScriptedBackend::new(|| Ok(true)));
        let call = approve_call();

        let handle = scripted_gateway(&backend).submit("Approve ERC20 Transfer", call.clone());

        assert_eq!(handle.settled().await, Ok(backend.tx_hash));
        assert_eq!(
            backend.waits.lock().unwrap().clone(),
            vec![(backend.tx_hash, 3, Duration::from_secs(5))]
        );

        let broadcasts = backend.broadcasts.lock().unwrap().clone();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0].from, Some(Address::repeat_byte(0x01)));
        assert_eq!(broadcasts[0].input.input(), Some(&call.data));
    }

    #[tokio::test]
    async fn failed_receipt_is_reverted() {
        let backend = Arc::new(ScriptedBackend::new(|| Ok(false)));

        let handle = scripted_gateway(&backend).submit("Stake Tokens", approve_call());

        assert_eq!(
            handle.settled().await,
            Err(CallFailure::Reverted(backend.tx_hash))
        );
    }

    #[tokio::test]
    async fn missing_receipt_is_dropped() {
        let backend = Arc::new(ScriptedBackend::new(|| {
            Err(PendingTransactionError::TxWatcher(WatchTxError::Timeout))
        }));

        let handle = scripted_gateway(&backend).submit("Stake Tokens", approve_call());

        assert_eq!(
            handle.settled().await,
            Err(CallFailure::Dropped(backend.tx_hash))
        );
    }

    #[test]
    fn only_signer_phrases_count_as_rejection() {
        let payload = |code: i64, message: &'static str| ErrorPayload {
            code,
            message: message.into(),
            data: None,
        };

        assert!(is_user_rejection(&payload(4001, "whatever")));
        assert!(is_user_rejection(&payload(-32000, "User rejected the request.")));
        assert!(is_user_rejection(&payload(
            -32603,
            "MetaMask Tx Signature: User denied transaction signature."
        )));
        assert!(!is_user_rejection(&payload(-32000, "transaction rejected: underpriced")));
        assert!(!is_user_rejection(&payload(-32000, "insufficient funds for gas")));
    }
}
