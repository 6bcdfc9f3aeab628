//! # Relay Engine Service
//!
//! Application service that wires the domain checks, the module catalogue
//! and the journaled ledger into the relay pipeline:
//!
//! ```text
//! relay(request, submission)
//!   -> wallet / module / binding / deny-list       (dispatch checks)
//!   -> descriptor, signature count, attached gas   (pre-state checks)
//!   -> nonce, signer recovery, quorum              (authorization)
//!   -> module.execute  [savepoint]                 (failure = rollback to savepoint)
//!   -> refund + daily limit                        (failure = reject whole relay)
//!   -> commit, publish events
//! ```
//!
//! The ledger write lock is held for the whole pipeline, so relays are
//! serialized and each one is applied fully or not at all.

use crate::adapters::event_log::InMemoryEventLog;
use crate::adapters::ledger::{InMemoryLedger, LedgerTransaction};
use crate::adapters::price_storage::TokenPriceStorage;
use crate::adapters::signature::EcdsaRecoveryAdapter;
use crate::config::{ConfigError, EngineConfig, GasCheckPolicy};
use crate::context::{CallOrigin, ModuleContext};
use crate::domain::daily_limit::DailyLimit;
use crate::domain::deny_list::DenyList;
use crate::domain::entities::{
    DirectCall, RefundReceipt, RelayOutcome, RelayRequest, RelaySubmission,
    WalletRecord,
};
use crate::domain::nonce::NonceRecord;
use crate::domain::quorum::{check_signature_count, check_signers};
use crate::domain::refund::{plan_refund, RefundDecision, RefundInput};
use crate::domain::registry::{ModuleRegistry, RegistryUpdate};
use crate::domain::request_hash::{relay_request_hash, signing_digest};
use crate::domain::value_objects::{
    AuthorizationDescriptor, Bytes, CallData, GasMeter, Hash, Nonce, OwnerSignatureRequirement,
    Selector, BASE_ASSET_ADDRESS,
};
use crate::errors::{AccessError, RelayError, WalletError};
use crate::events::RelayEvent;
use crate::ports::inbound::RelayApi;
use crate::ports::outbound::{EventSink, PriceOracle, SignatureVerifier, WalletModule};
use ks_01_signature_verification::eth_signed_message_hash;
use ks_telemetry::metrics::{self, HistogramTimer, DIRECT_INVOCATIONS, RELAY_DURATION};
use parking_lot::RwLock;
use shared_types::Address;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, field, info, instrument, warn, Span};
use uuid::Uuid;

/// Statistics for the relay engine.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Relays whose nonce was consumed.
    pub relays_accepted: u64,
    /// Relays rejected before or after execution (nothing applied).
    pub relays_rejected: u64,
    /// Accepted relays whose module call failed.
    pub module_failures: u64,
    /// Refunds paid.
    pub refunds_paid: u64,
    /// Successful direct invocations.
    pub direct_invocations: u64,
    /// Total metered gas of accepted relays.
    pub total_gas_used: u64,
}

/// Engine wired to the in-memory adapters.
pub type DefaultRelayEngine =
    RelayEngine<EcdsaRecoveryAdapter, Arc<TokenPriceStorage>, Arc<InMemoryEventLog>>;

/// Dispatch target resolved by the shared pre-checks.
struct Dispatch {
    wallet: WalletRecord,
    module: Arc<dyn WalletModule>,
    descriptor: AuthorizationDescriptor,
}

/// The relay & authorization engine.
pub struct RelayEngine<V: SignatureVerifier, P: PriceOracle, E: EventSink> {
    config: EngineConfig,
    deny_list: DenyList,
    ledger: InMemoryLedger,
    registry: RwLock<Arc<ModuleRegistry>>,
    modules: RwLock<HashMap<Address, Arc<dyn WalletModule>>>,
    verifier: V,
    prices: P,
    events: E,
    stats: RwLock<ServiceStats>,
}

impl<V: SignatureVerifier, P: PriceOracle, E: EventSink> RelayEngine<V, P, E> {
    /// Create an engine over `ledger` with an initial `registry` value.
    pub fn new(
        config: EngineConfig,
        registry: ModuleRegistry,
        ledger: InMemoryLedger,
        verifier: V,
        prices: P,
        events: E,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            engine = %config.engine_address,
            chain_id = config.chain_id,
            modules = registry.len(),
            "Relay engine created"
        );
        Ok(Self {
            deny_list: config.deny_list(),
            config,
            ledger,
            registry: RwLock::new(Arc::new(registry)),
            modules: RwLock::new(HashMap::new()),
            verifier,
            prices,
            events,
            stats: RwLock::new(ServiceStats::default()),
        })
    }

    /// Make a module implementation callable. Attaching it to wallets still
    /// requires registry registration.
    pub fn deploy_module(&self, module: Arc<dyn WalletModule>) {
        debug!(module = %module.address(), name = module.name(), "Module deployed");
        self.modules.write().insert(module.address(), module);
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Engine identity.
    pub fn address(&self) -> Address {
        self.config.engine_address
    }

    /// The ledger the engine writes to.
    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }

    /// Current registry value.
    pub fn registry(&self) -> Arc<ModuleRegistry> {
        Arc::clone(&self.registry.read())
    }

    /// Event sink.
    pub fn events(&self) -> &E {
        &self.events
    }

    /// Get current service statistics.
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    /// Canonical request hash (before EIP-191 wrapping).
    pub fn request_hash(&self, request: &RelayRequest) -> Hash {
        relay_request_hash(&self.config.engine_address, self.config.chain_id, request)
    }

    /// Wallet daily limit, or the configured default if never set.
    pub fn daily_limit_of(&self, wallet: &Address) -> DailyLimit {
        self.ledger
            .daily_limit_of(wallet)
            .unwrap_or_else(|| DailyLimit::new(self.config.default_daily_limit))
    }

    fn module(&self, address: &Address) -> Option<Arc<dyn WalletModule>> {
        self.modules.read().get(address).cloned()
    }

    // =========================================================================
    // SHARED PRE-CHECKS
    // =========================================================================

    /// Wallet existence, module attachment, wallet binding, deny-list and
    /// descriptor lookup. Reads only.
    fn resolve(
        &self,
        tx: &LedgerTransaction<'_>,
        wallet: &Address,
        target_module: &Address,
        payload: &CallData,
    ) -> Result<Dispatch, RelayError> {
        let record = tx
            .wallet(wallet)
            .cloned()
            .ok_or(RelayError::UnknownWallet(*wallet))?;

        if !record.is_module(target_module) {
            return Err(RelayError::ModuleNotAuthorized {
                module: *target_module,
            });
        }

        let selector = bound_selector(payload, wallet)?;

        if self.deny_list.is_denied(target_module, &selector) {
            return Err(RelayError::DisabledMethod {
                module: *target_module,
                selector,
            });
        }

        let unsupported = || RelayError::UnsupportedOperation {
            module: *target_module,
            selector,
        };
        let module = self.module(target_module).ok_or_else(unsupported)?;
        let descriptor = module
            .authorization_descriptor(&selector, &record)
            .ok_or_else(unsupported)?;

        Ok(Dispatch {
            wallet: record,
            module,
            descriptor,
        })
    }

    fn reject(&self, error: RelayError) -> RelayError {
        warn!(kind = error.kind_label(), error = %error, "Relay rejected");
        metrics::record_rejection(error.kind_label());
        self.stats.write().relays_rejected += 1;
        error
    }

    fn publish_all(&self, events: Vec<RelayEvent>) {
        for event in events {
            self.events.publish(event);
        }
    }

    // =========================================================================
    // RELAY PIPELINE
    // =========================================================================

    fn relay_inner(
        &self,
        request: &RelayRequest,
        submission: &RelaySubmission,
        correlation_id: Uuid,
    ) -> Result<(RelayOutcome, Vec<RelayEvent>), RelayError> {
        let registry = self.registry();
        let mut state = self.ledger.write();
        let mut tx = state.begin();

        let Dispatch {
            wallet,
            module,
            descriptor,
        } = self.resolve(&tx, &request.wallet, &request.target_module, &request.payload)?;

        check_signature_count(&descriptor, request.signatures.len())?;

        let schedule = &self.config.gas_schedule;
        let verification_gas = schedule.verification_cost(request.signatures.len());
        let usable_gas = match self.config.gas_check_policy {
            GasCheckPolicy::ModuleCallOnly => submission.gas_available,
            GasCheckPolicy::IncludeVerification => {
                submission.gas_available.saturating_sub(verification_gas)
            }
        };
        if usable_gas < request.gas_limit {
            return Err(RelayError::InsufficientGas {
                required: request.gas_limit,
                available: usable_gas,
            });
        }

        let sign_hash = self.request_hash(request);
        let uses_nonce = descriptor.uses_wallet_nonce();
        let mut nonces: NonceRecord = tx.nonce_record(&request.wallet);
        if uses_nonce {
            nonces.check(
                request.nonce,
                submission.block.number,
                self.config.nonce_block_bound,
            )?;
        } else {
            nonces.check_unexecuted(&sign_hash)?;
        }

        let digest = eth_signed_message_hash(&sign_hash);
        let signers = self.verifier.recover_all(&digest, &request.signatures)?;
        check_signers(&descriptor, &signers, &wallet)?;

        if uses_nonce {
            nonces.record(request.nonce);
        } else {
            nonces.record_executed(sign_hash);
        }
        tx.put_nonce_record(request.wallet, nonces);

        // Module phase: everything after this savepoint is discarded if the
        // module fails; the replay record above survives.
        let savepoint = tx.savepoint();
        let mut ctx = ModuleContext::new(
            &mut tx,
            &registry,
            &self.prices,
            &self.config,
            request.wallet,
            request.target_module,
            CallOrigin::Relayed {
                engine: self.config.engine_address,
            },
            submission.block,
            GasMeter::new(request.gas_limit),
        );
        let result = module.execute(&mut ctx, &request.payload);
        let (module_gas, module_events) = ctx.finish();

        let (success, return_data, error_detail, mut events) = match result {
            Ok(data) => (true, data, None, module_events),
            Err(e) => {
                debug!(error = %e, "Module call failed; rolling back module effects");
                tx.rollback_to(savepoint);
                (false, Bytes::new(), Some(e.to_string()), Vec::new())
            }
        };

        let metered_gas = verification_gas.saturating_add(module_gas);
        let decision = plan_refund(
            &RefundInput {
                gas_price: request.gas_price,
                tx_gas_price: submission.tx_gas_price,
                metered_gas,
                gas_limit: request.gas_limit,
                asset: request.refund_asset(),
                refund_address: request.refund_address,
                submitter: submission.submitter,
                owner_requirement: descriptor.owner_requirement,
                module_succeeded: success,
            },
            schedule,
            |token| self.prices.price_of(&token),
        )?;

        let refund = match decision {
            RefundDecision::Skipped(reason) => {
                debug!(?reason, "Refund skipped");
                None
            }
            RefundDecision::Pay(plan) => {
                let now = submission.block.timestamp;
                let limit = tx
                    .daily_limit(&request.wallet)
                    .unwrap_or_else(|| DailyLimit::new(self.config.default_daily_limit));
                let next = if descriptor.involves_guardians() {
                    limit.reset_spent(now)
                } else {
                    limit.spend(plan.base_amount, now, self.config.limit_period_secs)?
                };
                if next != limit {
                    tx.put_daily_limit(request.wallet, next);
                }

                tx.transfer(&request.wallet, &plan.recipient, plan.asset, plan.amount)
                    .map_err(|e| RelayError::RefundTransferFailed(e.to_string()))?;

                events.push(RelayEvent::Refund {
                    wallet: request.wallet,
                    refund_address: plan.recipient,
                    refund_token: plan.asset.to_address(),
                    amount: plan.amount,
                });
                Some(RefundReceipt {
                    token: plan.asset.to_address(),
                    recipient: plan.recipient,
                    amount: plan.amount,
                    base_amount: plan.base_amount,
                    gas_consumed: plan.gas_consumed,
                })
            }
        };

        tx.commit();

        events.push(RelayEvent::TransactionExecuted {
            wallet: request.wallet,
            success,
            return_data: return_data.clone(),
            sign_hash,
            correlation_id,
        });

        let gas_used = refund
            .as_ref()
            .map_or(metered_gas, |receipt| receipt.gas_consumed);
        Ok((
            RelayOutcome {
                success,
                error_detail,
                return_data,
                sign_hash,
                gas_used,
                refund,
                correlation_id,
            },
            events,
        ))
    }

    fn invoke_inner(&self, call: &DirectCall) -> Result<(Bytes, Vec<RelayEvent>), RelayError> {
        let registry = self.registry();
        let mut state = self.ledger.write();
        let mut tx = state.begin();

        let Dispatch {
            wallet,
            module,
            descriptor,
        } = self.resolve(&tx, &call.wallet, &call.target_module, &call.payload)?;

        descriptor.validate()?;
        if !may_invoke_directly(&descriptor, &wallet, &call.caller) {
            return Err(RelayError::UnauthorizedCaller {
                caller: call.caller,
            });
        }

        let mut ctx = ModuleContext::new(
            &mut tx,
            &registry,
            &self.prices,
            &self.config,
            call.wallet,
            call.target_module,
            CallOrigin::Direct {
                caller: call.caller,
            },
            call.block,
            GasMeter::unbounded(),
        );
        let result = module.execute(&mut ctx, &call.payload);
        let (_, events) = ctx.finish();

        let data = result.map_err(|e| RelayError::ModuleExecutionFailed(e.to_string()))?;
        tx.commit();
        Ok((data, events))
    }
}

/// Selector of `payload`, provided its first argument is `wallet`.
fn bound_selector(payload: &CallData, wallet: &Address) -> Result<Selector, RelayError> {
    let selector = payload.selector().map_err(|_| RelayError::WalletMismatch)?;
    match payload.address_arg(0) {
        Ok(first) if first == *wallet => Ok(selector),
        _ => Err(RelayError::WalletMismatch),
    }
}

/// Direct calls: operations needing no signature are open to anyone; single
/// signature operations that accept the owner are open to the owner. Anything
/// needing guardians or excluding the owner must be relayed.
fn may_invoke_directly(
    descriptor: &AuthorizationDescriptor,
    wallet: &WalletRecord,
    caller: &Address,
) -> bool {
    match descriptor.required_signatures {
        0 => true,
        1 => {
            descriptor.owner_requirement != OwnerSignatureRequirement::AnyoneButOwner
                && *caller == wallet.owner
        }
        _ => false,
    }
}

// =============================================================================
// INBOUND API
// =============================================================================

impl<V: SignatureVerifier, P: PriceOracle, E: EventSink> RelayApi for RelayEngine<V, P, E> {
    #[instrument(skip_all, fields(wallet = %wallet, owner = %owner))]
    fn init_wallet(
        &self,
        wallet: Address,
        owner: Address,
        modules: &[Address],
    ) -> Result<(), WalletError> {
        let registry = self.registry();
        let mut state = self.ledger.write();
        let mut tx = state.begin();

        if tx.wallet(&wallet).is_some() {
            return Err(WalletError::AlreadyInitialized);
        }
        let record = WalletRecord::new(owner, modules.iter().copied())?;
        if let Some(unregistered) = record.modules.iter().find(|m| !registry.is_registered(m)) {
            return Err(WalletError::ModuleNotRegistered(*unregistered));
        }

        let events: Vec<RelayEvent> = std::iter::once(RelayEvent::WalletInitialised { wallet, owner })
            .chain(record.modules.iter().map(|module| RelayEvent::ModuleAuthorised {
                wallet,
                module: *module,
                value: true,
            }))
            .collect();
        tx.put_wallet(wallet, record);
        tx.commit();
        drop(state);

        info!(modules = modules.len(), "Wallet initialised");
        self.publish_all(events);
        Ok(())
    }

    fn is_authorized(&self, wallet: &Address, module: &Address) -> bool {
        self.ledger
            .read()
            .wallet(wallet)
            .is_some_and(|record| record.is_module(module))
    }

    fn current_nonce(&self, wallet: &Address) -> Result<Nonce, RelayError> {
        let state = self.ledger.read();
        if state.wallet(wallet).is_none() {
            return Err(RelayError::UnknownWallet(*wallet));
        }
        Ok(state.nonce_record(wallet).current())
    }

    fn signing_digest(&self, request: &RelayRequest) -> Hash {
        signing_digest(&self.config.engine_address, self.config.chain_id, request)
    }

    #[instrument(
        skip_all,
        fields(
            wallet = %request.wallet,
            module = %request.target_module,
            nonce = ?request.nonce,
            correlation_id = field::Empty,
        )
    )]
    fn relay(
        &self,
        request: RelayRequest,
        submission: RelaySubmission,
    ) -> Result<RelayOutcome, RelayError> {
        let correlation_id = Uuid::new_v4();
        Span::current().record("correlation_id", field::display(correlation_id));
        let _timer = HistogramTimer::new(&RELAY_DURATION);

        let (outcome, events) = self
            .relay_inner(&request, &submission, correlation_id)
            .map_err(|e| self.reject(e))?;

        {
            let mut stats = self.stats.write();
            stats.relays_accepted += 1;
            stats.total_gas_used = stats.total_gas_used.saturating_add(outcome.gas_used);
            if !outcome.success {
                stats.module_failures += 1;
            }
            if outcome.refund.is_some() {
                stats.refunds_paid += 1;
            }
        }
        metrics::record_executed(outcome.success);
        if let Some(receipt) = &outcome.refund {
            metrics::record_refund(receipt.token != BASE_ASSET_ADDRESS);
        }

        if outcome.success {
            info!(gas_used = outcome.gas_used, refunded = outcome.refund.is_some(), "Relay executed");
        } else {
            warn!(
                error = outcome.error_detail.as_deref().unwrap_or_default(),
                "Relay accepted but module call failed"
            );
        }
        self.publish_all(events);
        Ok(outcome)
    }

    #[instrument(skip_all, fields(caller = %call.caller, wallet = %call.wallet, module = %call.target_module))]
    fn invoke(&self, call: DirectCall) -> Result<Bytes, RelayError> {
        let (data, events) = self.invoke_inner(&call).map_err(|e| self.reject(e))?;
        self.stats.write().direct_invocations += 1;
        ks_telemetry::metric_inc!(DIRECT_INVOCATIONS);
        info!("Direct invocation executed");
        self.publish_all(events);
        Ok(data)
    }

    #[instrument(skip_all, fields(caller = %caller))]
    fn update_registry(&self, caller: &Address, update: RegistryUpdate) -> Result<(), AccessError> {
        let event = {
            let mut registry = self.registry.write();
            let next = registry.apply(caller, update)?;
            let event = RelayEvent::RegistryUpdated {
                module_count: next.len(),
                owner: next.owner(),
            };
            *registry = Arc::new(next);
            event
        };
        info!("Module registry updated");
        self.events.publish(event);
        Ok(())
    }
}
