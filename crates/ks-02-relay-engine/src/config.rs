//! # Engine Configuration
//!
//! Loaded from defaults, JSON or `KS_*` environment variables.

use crate::domain::deny_list::{DenyEntry, DenyList};
use crate::domain::value_objects::U256;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::env;
use thiserror::Error;

/// Default engine identity (`0x…4b53`, "KS").
pub const DEFAULT_ENGINE_ADDRESS: Address = Address::from_low_u64(0x4b53);

/// Errors while loading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable present but unparsable.
    #[error("invalid value for {key}: {value}")]
    InvalidEnv {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// JSON document rejected.
    #[error("invalid config json: {0}")]
    Json(String),

    /// Semantically invalid configuration.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the attached-gas check treats signature verification cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GasCheckPolicy {
    /// Compare attached gas with the signed `gas_limit` directly.
    #[default]
    ModuleCallOnly,
    /// Subtract the metered verification cost from attached gas first.
    IncludeVerification,
}

/// Gas charged for relay steps and module operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasSchedule {
    /// Fixed relay cost.
    pub relay_base: u64,
    /// Per signature recovered.
    pub per_signature: u64,
    /// Refund paid in the base asset.
    pub refund_overhead_base: u64,
    /// Refund paid in a token.
    pub refund_overhead_token: u64,
    /// Storage or wallet-record write.
    pub storage_write: u64,
    /// Storage read.
    pub storage_read: u64,
    /// Asset transfer.
    pub transfer: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            relay_base: 21_000,
            per_signature: 3_000,
            refund_overhead_base: 23_000,
            refund_overhead_token: 37_500,
            storage_write: 20_000,
            storage_read: 2_100,
            transfer: 9_000,
        }
    }
}

impl GasSchedule {
    /// Gas metered for verifying `signatures` signatures.
    #[must_use]
    pub fn verification_cost(&self, signatures: usize) -> u64 {
        let per_sig = self.per_signature.saturating_mul(signatures as u64);
        self.relay_base.saturating_add(per_sig)
    }
}

/// Relay engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chain id bound into every request hash.
    pub chain_id: u64,
    /// Engine identity: bound into request hashes and the origin of relayed calls.
    pub engine_address: Address,
    /// How far ahead of the current block a nonce's block may run.
    pub nonce_block_bound: u64,
    /// Attached-gas check policy.
    pub gas_check_policy: GasCheckPolicy,
    /// Gas costs.
    pub gas_schedule: GasSchedule,
    /// Daily-limit window length.
    pub limit_period_secs: u64,
    /// Delay before a limit change takes effect.
    pub limit_security_period_secs: u64,
    /// Limit of wallets that never set one. `U256::MAX` disables it.
    pub default_daily_limit: U256,
    /// Deny-list entries added to the default table.
    pub extra_denied: Vec<DenyEntry>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            engine_address: DEFAULT_ENGINE_ADDRESS,
            nonce_block_bound: 10_000,
            gas_check_policy: GasCheckPolicy::default(),
            gas_schedule: GasSchedule::default(),
            limit_period_secs: 86_400,
            limit_security_period_secs: 86_400,
            default_daily_limit: U256::MAX,
            extra_denied: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KS_CHAIN_ID`: Chain id (default: 1)
    /// - `KS_ENGINE_ADDRESS`: Engine identity, hex (default: `DEFAULT_ENGINE_ADDRESS`)
    /// - `KS_NONCE_BLOCK_BOUND`: Nonce look-ahead in blocks (default: 10000)
    /// - `KS_GAS_CHECK_POLICY`: `module-call-only` or `include-verification`
    /// - `KS_LIMIT_PERIOD_SECS`: Daily-limit window (default: 86400)
    /// - `KS_LIMIT_SECURITY_PERIOD_SECS`: Limit change delay (default: 86400)
    /// - `KS_DEFAULT_DAILY_LIMIT`: Decimal default limit (default: disabled)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            chain_id: parse_env("KS_CHAIN_ID", |v| v.parse().ok())?.unwrap_or(defaults.chain_id),
            engine_address: parse_env("KS_ENGINE_ADDRESS", |v| v.parse().ok())?
                .unwrap_or(defaults.engine_address),
            nonce_block_bound: parse_env("KS_NONCE_BLOCK_BOUND", |v| v.parse().ok())?
                .unwrap_or(defaults.nonce_block_bound),
            gas_check_policy: parse_env("KS_GAS_CHECK_POLICY", parse_policy)?
                .unwrap_or(defaults.gas_check_policy),
            gas_schedule: defaults.gas_schedule,
            limit_period_secs: parse_env("KS_LIMIT_PERIOD_SECS", |v| v.parse().ok())?
                .unwrap_or(defaults.limit_period_secs),
            limit_security_period_secs: parse_env("KS_LIMIT_SECURITY_PERIOD_SECS", |v| {
                v.parse().ok()
            })?
            .unwrap_or(defaults.limit_security_period_secs),
            default_daily_limit: parse_env("KS_DEFAULT_DAILY_LIMIT", |v| {
                U256::from_dec_str(v).ok()
            })?
            .unwrap_or(defaults.default_daily_limit),
            extra_denied: Vec::new(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine_address.is_zero() {
            return Err(ConfigError::Invalid("engine_address must not be zero".into()));
        }
        if self.limit_period_secs == 0 {
            return Err(ConfigError::Invalid("limit_period_secs must be positive".into()));
        }
        if self.gas_schedule.refund_overhead_base == 0 || self.gas_schedule.refund_overhead_token == 0 {
            return Err(ConfigError::Invalid("refund overheads must be positive".into()));
        }
        Ok(())
    }

    /// Default deny table plus configured extras.
    #[must_use]
    pub fn deny_list(&self) -> DenyList {
        DenyList::default_for(self.engine_address).with_entries(self.extra_denied.iter().copied())
    }
}

fn parse_policy(value: &str) -> Option<GasCheckPolicy> {
    match value.to_lowercase().as_str() {
        "module-call-only" => Some(GasCheckPolicy::ModuleCallOnly),
        "include-verification" => Some(GasCheckPolicy::IncludeVerification),
        _ => None,
    }
}

fn parse_env<T>(
    key: &'static str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => parse(value.trim())
            .map(Some)
            .ok_or(ConfigError::InvalidEnv { key, value }),
        Err(_) => Ok(None),
    }
}
