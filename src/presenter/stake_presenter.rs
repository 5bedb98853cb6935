use crate::entity::{Deployment, FarmError, OrchestrationState, StakeRequest, Token, TransactionPhase};
use crate::interactor::stake_interactor::StakeInteractor;
use crate::presenter::stake_status::{notifications_since, project};
use crate::utils::parse_amount_and_token;
use crate::view::stake_view::StakeView;
use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

#[async_trait]
pub trait StakePresenter: Send + Sync {
    /// Handles `/stake <amount> <token>`.
    async fn stake(&self, args: &str) -> Result<()>;
    async fn show_status(&self) -> Result<()>;
}

pub struct StakePresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    deployment: Deployment,
}

impl<I, V> StakePresenterImpl<I, V>
where
    I: StakeInteractor,
    V: StakeView + 'static,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, deployment: Deployment) -> Self {
        Self {
            interactor,
            view,
            deployment,
        }
    }

    fn token_for(&self, state: &OrchestrationState) -> Token {
        let address = state.token_address.unwrap_or_default();

        self.deployment
            .tokens
            .iter()
            .find(|token| token.address == address)
            .cloned()
            .unwrap_or_else(|| Token {
                symbol: address.to_string(),
                name: address.to_string(),
                address,
                decimals: 18,
            })
    }
}

/// Mirrors the orchestrator's state into the view until the request ends
/// or is superseded.
async fn follow<V: StakeView + ?Sized>(
    view: Arc<V>,
    mut receiver: watch::Receiver<OrchestrationState>,
    request_id: Uuid,
    token: Token,
) -> Result<()> {
    let mut seen = TransactionPhase::NotStarted;

    loop {
        let state = receiver.borrow_and_update().clone();

        if state.request_id != Some(request_id) {
            if state.request_id.is_some() {
                view.display_superseded().await?;
            }
            return Ok(());
        }

        if state.phase != seen {
            for notification in notifications_since(seen, &state) {
                view.display_notification(&token, &notification).await?;
            }
            view.display_progress(&token, &state, project(&state)).await?;
            seen = state.phase;
        }

        if state.phase.is_terminal() || receiver.changed().await.is_err() {
            return Ok(());
        }
    }
}

#[async_trait]
impl<I, V> StakePresenter for StakePresenterImpl<I, V>
where
    I: StakeInteractor + Send + Sync,
    V: StakeView + Send + Sync + 'static,
{
    async fn stake(&self, args: &str) -> Result<()> {
        let Some((amount, symbol)) = parse_amount_and_token(args) else {
            self.view.display_usage().await?;
            return Ok(());
        };

        if self.deployment.is_placeholder() {
            self.view
                .display_unsupported_network(self.deployment.chain_id)
                .await?;
            return Ok(());
        }

        let Some(token) = self.deployment.find_token(symbol).cloned() else {
            self.view
                .display_unknown_token(symbol, &self.deployment.tokens)
                .await?;
            return Ok(());
        };

        let request = match StakeRequest::from_display_amount(token.address, amount, token.decimals)
        {
            Ok(request) => request,
            Err(FarmError::InvalidInput(reason)) => {
                self.view.display_invalid_amount(reason).await?;
                return Ok(());
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
                return Ok(());
            }
        };

        // Subscribe first so the follower sees the request from its start.
        let receiver = self.interactor.subscribe();

        match self.interactor.submit(request) {
            Ok(request_id) => {
                info!("Stake request {} submitted for {} {}", request_id, amount, token.symbol);

                let view = self.view.clone();
                tokio::spawn(async move {
                    if let Err(e) = follow(view, receiver, request_id, token).await {
                        error!("Failed to report progress of request {}: {}", request_id, e);
                    }
                });
            }
            Err(FarmError::InvalidInput(reason)) => {
                self.view.display_invalid_amount(reason).await?;
            }
            Err(FarmError::ConfigurationMissing(chain_id)) => {
                self.view.display_unsupported_network(chain_id).await?;
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
            }
        }

        Ok(())
    }

    async fn show_status(&self) -> Result<()> {
        let state = self.interactor.state();

        if state.request_id.is_none() {
            self.view.display_no_request().await?;
            return Ok(());
        }

        let token = self.token_for(&state);
        self.view
            .display_status(&token, &state, project(&state))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{CallFailure, CallStatus, ContractCall};
    use crate::interactor::stake_interactor::testing::ScriptedGateway;
    use crate::interactor::StakeOrchestrator;
    use crate::presenter::stake_status::{Notification, StatusFlags};
    use alloy::primitives::{Address, TxHash, U256};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[derive(Default)]
    struct RecordingView {
        events: Mutex<Vec<String>>,
    }

    impl RecordingView {
        fn record(&self, event: String) -> Result<()> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StakeView for RecordingView {
        async fn display_usage(&self) -> Result<()> {
            self.record("usage".to_string())
        }

        async fn display_unsupported_network(&self, chain_id: u64) -> Result<()> {
            self.record(format!("unsupported:{}", chain_id))
        }

        async fn display_unknown_token(&self, symbol: &str, _available: &[Token]) -> Result<()> {
            self.record(format!("unknown:{}", symbol))
        }

        async fn display_invalid_amount(&self, error_message: String) -> Result<()> {
            self.record(format!("invalid:{}", error_message))
        }

        async fn display_error(&self, error_message: String) -> Result<()> {
            self.record(format!("error:{}", error_message))
        }

        async fn display_progress(
            &self,
            _token: &Token,
            state: &OrchestrationState,
            _flags: StatusFlags,
        ) -> Result<()> {
            self.record(format!("progress:{}", state.phase))
        }

        async fn display_notification(
            &self,
            token: &Token,
            notification: &Notification,
        ) -> Result<()> {
            let event = match notification {
                Notification::ApprovalSucceeded => format!("approved:{}", token.symbol),
                Notification::StakeSucceeded => format!("staked:{}", token.symbol),
                Notification::Failed(_) => format!("failed:{}", token.symbol),
            };
            self.record(event)
        }

        async fn display_superseded(&self) -> Result<()> {
            self.record("superseded".to_string())
        }

        async fn display_status(
            &self,
            token: &Token,
            state: &OrchestrationState,
            flags: StatusFlags,
        ) -> Result<()> {
            self.record(format!("status:{}:{}:{:?}", token.symbol, state.phase, flags.status))
        }

        async fn display_no_request(&self) -> Result<()> {
            self.record("no_request".to_string())
        }
    }

    fn deployment() -> Deployment {
        Deployment {
            chain_id: 4,
            network: "rinkeby".to_string(),
            token_farm: Address::repeat_byte(0xfa),
            tokens: vec![Token {
                symbol: "NEL".to_string(),
                name: "Nellarium".to_string(),
                address: Address::repeat_byte(0x22),
                decimals: 18,
            }],
        }
    }

    struct Fixture {
        gateway: Arc<ScriptedGateway>,
        view: Arc<RecordingView>,
        presenter: StakePresenterImpl<StakeOrchestrator, RecordingView>,
    }

    fn fixture(deployment: Deployment) -> Fixture {
        let gateway = Arc::new(ScriptedGateway::default());
        let orchestrator = Arc::new(StakeOrchestrator::new(
            gateway.clone(),
            deployment.chain_id,
            deployment.token_farm,
        ));
        let view = Arc::new(RecordingView::default());
        let presenter = StakePresenterImpl::new(orchestrator, view.clone(), deployment);

        Fixture {
            gateway,
            view,
            presenter,
        }
    }

    async fn wait_for_event(view: &RecordingView, event: &str) {
        timeout(Duration::from_secs(2), async {
            while !view.events().iter().any(|e| e == event) {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("event {} not seen, got {:?}", event, view.events()));
    }

    #[tokio::test]
    async fn reports_full_stake_lifecycle() {
        let f = fixture(deployment());

        f.presenter.stake("1.5 NEL").await.unwrap();
        wait_for_event(&f.view, "progress:APPROVAL_PENDING").await;

        let calls = f.gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].1,
            ContractCall::approve(
                Address::repeat_byte(0x22),
                Address::repeat_byte(0xfa),
                U256::from(1_500_000_000_000_000_000u128)
            )
        );

        f.gateway.resolve(
            0,
            CallStatus::Success {
                tx_hash: TxHash::repeat_byte(0x01),
            },
        );
        wait_for_event(&f.view, "approved:NEL").await;

        f.gateway.resolve(
            1,
            CallStatus::Success {
                tx_hash: TxHash::repeat_byte(0x02),
            },
        );
        wait_for_event(&f.view, "staked:NEL").await;
        wait_for_event(&f.view, "progress:STAKE_CONFIRMED").await;

        f.presenter.show_status().await.unwrap();
        assert!(f
            .view
            .events()
            .contains(&"status:NEL:STAKE_CONFIRMED:Success".to_string()));
    }

    #[tokio::test]
    async fn reports_rejected_approval() {
        let f = fixture(deployment());

        f.presenter.stake("2 nel").await.unwrap();
        f.gateway.resolve(
            0,
            CallStatus::Failed(CallFailure::Rejected("User denied".to_string())),
        );

        wait_for_event(&f.view, "failed:NEL").await;
        wait_for_event(&f.view, "progress:FAILED").await;
        assert_eq!(f.gateway.calls().len(), 1);
        assert!(!f.view.events().contains(&"approved:NEL".to_string()));
    }

    #[tokio::test]
    async fn bad_input_issues_no_call() {
        let f = fixture(deployment());

        f.presenter.stake("lots of NEL").await.unwrap();
        f.presenter.stake("1 DAI").await.unwrap();
        f.presenter.stake("0 NEL").await.unwrap();

        let events = f.view.events();
        assert_eq!(events[0], "usage");
        assert_eq!(events[1], "unknown:DAI");
        assert!(events[2].starts_with("invalid:"));
        assert!(f.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn unsupported_network_is_reported() {
        let f = fixture(Deployment::placeholder(1));

        f.presenter.stake("1 NEL").await.unwrap();

        assert_eq!(f.view.events(), vec!["unsupported:1".to_string()]);
        assert!(f.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn status_without_request() {
        let f = fixture(deployment());

        f.presenter.show_status().await.unwrap();

        assert_eq!(f.view.events(), vec!["no_request".to_string()]);
    }

    #[tokio::test]
    async fn superseded_request_stops_reporting() {
        let f = fixture(deployment());

        f.presenter.stake("1 NEL").await.unwrap();
        wait_for_event(&f.view, "progress:APPROVAL_PENDING").await;
        f.presenter.stake("2 NEL").await.unwrap();

        wait_for_event(&f.view, "superseded").await;
        assert_eq!(f.gateway.calls().len(), 2);
    }
}
