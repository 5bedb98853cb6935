//! Static configuration: node connection settings and the TokenFarm
//! deployments per chain. Loaded once at startup.
use alloy::primitives::Address;
use anyhow::{anyhow, Context, Result};
use config::{Config as ConfigLoader, Environment, File, FileFormat};
use log::warn;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::chain::GatewaySettings;
use crate::entity::{Deployment, Token};

const DEFAULT_CONFIG_PATH: &str = "farm.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub address: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    pub token_farm: String,
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// JSON-RPC endpoint of a node holding the user's unlocked account
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Account to stake from; the node's first account when unset
    #[serde(default)]
    pub account: Option<String>,

    /// Blocks a receipt must be buried under before a call counts as confirmed
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,

    #[serde(default)]
    pub networks: Vec<NetworkConfig>,
}

fn default_decimals() -> u8 {
    18
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_confirmations() -> u64 {
    1
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_receipt_timeout_secs() -> u64 {
    300
}

impl AppConfig {
    /// Reads the file named by `FARM_CONFIG` (default `farm.toml`, optional)
    /// and overlays `FARM__*` environment variables.
    pub fn load() -> Result<Self> {
        let path = env::var("FARM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let loader = ConfigLoader::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix("FARM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        loader
            .try_deserialize()
            .context("Invalid farm configuration")
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        ConfigLoader::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()
            .context("Invalid farm configuration")
    }

    pub fn account_address(&self) -> Result<Option<Address>> {
        self.account
            .as_deref()
            .map(|raw| parse_config_address("account", raw))
            .transpose()
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            confirmations: self.confirmations.max(1),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            receipt_timeout: Duration::from_secs(self.receipt_timeout_secs),
        }
    }

    /// Contracts for `chain_id`. Unknown chains resolve to a placeholder
    /// whose addresses are all zero.
    pub fn resolve(&self, chain_id: u64) -> Result<Deployment> {
        let Some(network) = self.networks.iter().find(|n| n.chain_id == chain_id) else {
            warn!(
                "No deployment configured for chain {}; staking is disabled",
                chain_id
            );
            return Ok(Deployment::placeholder(chain_id));
        };

        let token_farm = parse_config_address("token_farm", &network.token_farm)?;

        let tokens = network
            .tokens
            .iter()
            .map(|token| {
                Ok(Token {
                    symbol: token.symbol.clone(),
                    name: token.name.clone().unwrap_or_else(|| token.symbol.clone()),
                    address: parse_config_address(&token.symbol, &token.address)?,
                    decimals: token.decimals,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Deployment {
            chain_id,
            network: network.name.clone(),
            token_farm,
            tokens,
        })
    }
}

fn parse_config_address(field: &str, raw: &str) -> Result<Address> {
    Address::from_str(raw.trim()).map_err(|e| anyhow!("Invalid address for {}: '{}' ({})", field, raw, e))
}
