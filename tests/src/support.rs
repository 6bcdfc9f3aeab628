//! # Scenario Fixtures
//!
//! Test signers, a handful of purpose-built modules and the [`World`]
//! harness: one engine, one wallet, every reference module attached.

use k256::ecdsa::SigningKey;
use ks_01_signature_verification::test_helpers::{sign, signing_key_from_seed};
use ks_01_signature_verification::{address_from_pubkey, EcdsaSignature};
use ks_02_relay_engine::prelude::*;
use ks_03_wallet_modules::standard_modules;
use lazy_static::lazy_static;
use shared_types::{keccak256, Address, Token};
use std::cell::Cell;
use std::sync::Arc;

// =============================================================================
// CONSTANTS
// =============================================================================

/// First address of the standard modules.
pub const MODULES_BASE: u64 = 0x500;
/// `ModuleManager`.
pub const MODULE_MANAGER: Address = Address::from_low_u64(MODULES_BASE);
/// `GuardianManager`.
pub const GUARDIAN_MANAGER: Address = Address::from_low_u64(MODULES_BASE + 1);
/// `TransferManager`.
pub const TRANSFER_MANAGER: Address = Address::from_low_u64(MODULES_BASE + 2);
/// `LimitManager`.
pub const LIMIT_MANAGER: Address = Address::from_low_u64(MODULES_BASE + 3);
/// `ApprovedTransfer`.
pub const APPROVED_TRANSFER: Address = Address::from_low_u64(MODULES_BASE + 4);
/// `RecoveryManager`.
pub const RECOVERY_MANAGER: Address = Address::from_low_u64(MODULES_BASE + 5);

/// [`TestModule`].
pub const TEST_MODULE: Address = Address::from_low_u64(0x700);
/// [`BadModule`].
pub const BAD_MODULE: Address = Address::from_low_u64(0x701);
/// [`TestLimitModule`].
pub const LIMIT_TEST_MODULE: Address = Address::from_low_u64(0x702);
/// Registered and deployed, never attached by [`World`].
pub const SPARE_MODULE: Address = Address::from_low_u64(0x7ff);

/// The wallet under test.
pub const WALLET: Address = Address::from_low_u64(0x3a11e7);
/// Registry and price-storage owner.
pub const INFRASTRUCTURE: Address = Address::from_low_u64(0x1f7a);
/// Relayer submitting the transactions.
pub const RELAYER: Address = Address::from_low_u64(0x9e1a7);
/// ERC-20 style token used for refunds.
pub const TOKEN: Address = Address::from_low_u64(0x70c);

/// Block the scenarios run in.
pub const BLOCK: u64 = 100;
/// Timestamp of [`BLOCK`].
pub const TIMESTAMP: u64 = 1_700_000_000;
/// Gas limit signed by default.
pub const GAS_LIMIT: u64 = 2_000_000;
/// Gas price paid by the relayer.
pub const GAS_PRICE: u64 = 10;

lazy_static! {
    /// `setIntOwnerOnly(wallet, value)`.
    pub static ref SET_INT: Selector = Selector::from_signature("setIntOwnerOnly(address,uint256)");
    /// `clearInt(wallet)`.
    pub static ref CLEAR_INT: Selector = Selector::from_signature("clearInt(address)");
    /// `setLimitAndDailySpent(wallet, limit, spent)`.
    pub static ref SET_LIMIT_AND_SPENT: Selector =
        Selector::from_signature("setLimitAndDailySpent(address,uint256,uint256)");

    static ref INT_KEY: Hash = keccak256(b"test.int");
}

// =============================================================================
// SIGNERS
// =============================================================================

/// A secp256k1 key and its address.
pub struct TestSigner {
    key: SigningKey,
    address: Address,
}

impl TestSigner {
    /// Fresh random signer.
    pub fn random() -> Self {
        Self::from_key(SigningKey::random(&mut rand::thread_rng()))
    }

    /// Deterministic signer for `seed`.
    pub fn from_seed(seed: &str) -> Self {
        Self::from_key(signing_key_from_seed(seed.as_bytes()))
    }

    fn from_key(key: SigningKey) -> Self {
        let address = address_from_pubkey(key.verifying_key());
        Self { key, address }
    }

    /// Signer address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signature over an already prepared digest.
    pub fn sign(&self, digest: &Hash) -> EcdsaSignature {
        sign(digest, &self.key)
    }
}

/// `count` random signers, ascending by address.
pub fn sorted_signers(count: usize) -> Vec<TestSigner> {
    let mut signers: Vec<TestSigner> = (0..count).map(|_| TestSigner::random()).collect();
    signers.sort_by_key(TestSigner::address);
    signers
}

// =============================================================================
// TEST MODULES
// =============================================================================

/// Stores an integer for the wallet. Callable by the owner, an attached
/// module, or a relay through an attached engine.
pub struct TestModule;

impl TestModule {
    /// Value stored for `wallet`.
    pub fn stored_int(ledger: &InMemoryLedger, wallet: Address) -> U256 {
        ledger.storage(&StorageSlot {
            module: TEST_MODULE,
            wallet,
            key: *INT_KEY,
        })
    }
}

impl WalletModule for TestModule {
    fn address(&self) -> Address {
        TEST_MODULE
    }

    fn name(&self) -> &str {
        "TestModule"
    }

    fn authorization_descriptor(
        &self,
        selector: &Selector,
        _wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        (*selector == *SET_INT || *selector == *CLEAR_INT).then(AuthorizationDescriptor::owner_only)
    }

    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError> {
        ctx.require_owner_or_module()?;
        let value = if call.selector()? == *SET_INT {
            call.uint_arg(1)?
        } else {
            U256::zero()
        };
        ctx.storage_set(*INT_KEY, value)?;
        Ok(Bytes::new())
    }
}

/// Publishes a descriptor no relay can satisfy: zero signatures with the
/// owner allowed.
pub struct BadModule;

impl WalletModule for BadModule {
    fn address(&self) -> Address {
        BAD_MODULE
    }

    fn name(&self) -> &str {
        "BadModule"
    }

    fn authorization_descriptor(
        &self,
        _selector: &Selector,
        _wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        Some(AuthorizationDescriptor::new(
            0,
            OwnerSignatureRequirement::OptionalOwner,
        ))
    }

    fn execute(&self, _ctx: &mut ModuleContext<'_, '_>, _call: &CallData) -> Result<Bytes, ModuleError> {
        Ok(Bytes::new())
    }
}

/// Overwrites the wallet's limit and the amount spent in the current window.
pub struct TestLimitModule;

impl WalletModule for TestLimitModule {
    fn address(&self) -> Address {
        LIMIT_TEST_MODULE
    }

    fn name(&self) -> &str {
        "TestLimitModule"
    }

    fn authorization_descriptor(
        &self,
        selector: &Selector,
        _wallet: &WalletRecord,
    ) -> Option<AuthorizationDescriptor> {
        (*selector == *SET_LIMIT_AND_SPENT).then(AuthorizationDescriptor::owner_only)
    }

    fn execute(&self, ctx: &mut ModuleContext<'_, '_>, call: &CallData) -> Result<Bytes, ModuleError> {
        ctx.require_owner_or_relayed()?;
        let limit = DailyLimit {
            limit: call.uint_arg(1)?,
            daily_spent: call.uint_arg(2)?,
            period_start: ctx.block().timestamp,
            pending_limit: None,
            change_after: 0,
        };
        ctx.put_daily_limit(limit)?;
        Ok(Bytes::new())
    }
}

// =============================================================================
// WORLD
// =============================================================================

/// One engine and one wallet owned by [`World::owner`].
pub struct World {
    /// The engine.
    pub engine: DefaultRelayEngine,
    /// Published events.
    pub events: Arc<InMemoryEventLog>,
    /// Token prices.
    pub prices: Arc<TokenPriceStorage>,
    /// Wallet owner.
    pub owner: TestSigner,
    /// Highest nonce index handed out in [`BLOCK`].
    issued: Cell<u128>,
}

impl World {
    /// Wallet with every module attached, the engine included.
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Wallet that never attached the engine.
    pub fn without_engine() -> Self {
        Self::build(false)
    }

    fn build(attach_engine: bool) -> Self {
        let _ = ks_telemetry::init_test_tracing();

        let config = EngineConfig::default();
        let mut modules = standard_modules(MODULES_BASE);
        modules.push(Arc::new(TestModule));
        modules.push(Arc::new(BadModule));
        modules.push(Arc::new(TestLimitModule));

        let mut registry = ModuleRegistry::new(INFRASTRUCTURE)
            .with_module(config.engine_address, "RelayEngine")
            .with_module(SPARE_MODULE, "SpareModule");
        for module in &modules {
            registry = registry.with_module(module.address(), module.name());
        }

        let events = Arc::new(InMemoryEventLog::new());
        let prices = Arc::new(TokenPriceStorage::new(INFRASTRUCTURE));
        let engine = RelayEngine::new(
            config,
            registry,
            InMemoryLedger::new(),
            EcdsaRecoveryAdapter::new(),
            Arc::clone(&prices),
            Arc::clone(&events),
        )
        .expect("default config is valid");

        let mut attached: Vec<Address> = modules.iter().map(|m| m.address()).collect();
        if attach_engine {
            attached.push(engine.address());
        }
        for module in modules {
            engine.deploy_module(module);
        }
        engine.deploy_module(Arc::new(ks_03_wallet_modules::ModuleManager::new(SPARE_MODULE)));

        let owner = TestSigner::random();
        engine
            .init_wallet(WALLET, owner.address(), &attached)
            .expect("wallet initialises");
        engine
            .ledger()
            .credit(WALLET, Asset::Base, U256::exp10(18));

        Self {
            engine,
            events,
            prices,
            owner,
            issued: Cell::new(0),
        }
    }

    /// Call data with the wallet prepended.
    pub fn payload(&self, selector: Selector, rest: &[Token]) -> CallData {
        let mut args = vec![Token::Address(WALLET)];
        args.extend_from_slice(rest);
        CallData::encode(selector, &args)
    }

    /// Next unused nonce in [`BLOCK`].
    ///
    /// Indices keep growing even when nothing consumes them, so requests
    /// guarded by their sign hash never collide.
    pub fn next_nonce(&self) -> Nonce {
        let current = self.engine.current_nonce(&WALLET).expect("wallet exists");
        let consumed = if current.block() == u128::from(BLOCK) {
            current.index()
        } else {
            0
        };
        let index = consumed.max(self.issued.get()) + 1;
        self.issued.set(index);
        Nonce::new(u128::from(BLOCK), index)
    }

    /// Unsigned request with no refund.
    pub fn request(&self, module: Address, payload: CallData) -> RelayRequest {
        RelayRequest {
            wallet: WALLET,
            target_module: module,
            payload,
            nonce: self.next_nonce(),
            gas_price: U256::zero(),
            gas_limit: GAS_LIMIT,
            refund_token: BASE_ASSET_ADDRESS,
            refund_address: Address::ZERO,
            signatures: Vec::new(),
        }
    }

    /// `request` with its signatures replaced, in the order given.
    pub fn signed(&self, mut request: RelayRequest, signers: &[&TestSigner]) -> RelayRequest {
        let digest = self.engine.signing_digest(&request);
        request.signatures = signers.iter().map(|s| s.sign(&digest)).collect();
        request
    }

    /// Relayer submission at [`BLOCK`] with `GAS_LIMIT` gas attached.
    pub fn submission(&self) -> RelaySubmission {
        self.submission_at(TIMESTAMP)
    }

    /// Relayer submission at `timestamp`.
    pub fn submission_at(&self, timestamp: u64) -> RelaySubmission {
        RelaySubmission {
            submitter: RELAYER,
            gas_available: GAS_LIMIT,
            tx_gas_price: U256::from(GAS_PRICE),
            block: BlockInfo::at(BLOCK, timestamp),
        }
    }

    /// Relay `request` in the default submission.
    pub fn relay(&self, request: RelayRequest) -> Result<RelayOutcome, RelayError> {
        self.engine.relay(request, self.submission())
    }

    /// Owner-signed relay of `payload` to `module`.
    pub fn owner_relay(&self, module: Address, payload: CallData) -> Result<RelayOutcome, RelayError> {
        let request = self.signed(self.request(module, payload), &[&self.owner]);
        self.relay(request)
    }

    /// Direct call from `caller`.
    pub fn invoke(
        &self,
        caller: Address,
        module: Address,
        payload: CallData,
        timestamp: u64,
    ) -> Result<Bytes, RelayError> {
        self.engine.invoke(DirectCall {
            caller,
            wallet: WALLET,
            target_module: module,
            payload,
            block: BlockInfo::at(BLOCK, timestamp),
        })
    }

    /// Add guardians through the `GuardianManager`, called by the owner.
    pub fn add_guardians(&self, guardians: &[&TestSigner]) {
        let add = Selector::from_signature("addGuardian(address,address)");
        for guardian in guardians {
            self.invoke(
                self.owner.address(),
                GUARDIAN_MANAGER,
                self.payload(add, &[Token::Address(guardian.address())]),
                TIMESTAMP,
            )
            .expect("guardian added");
        }
    }

    /// Set limit and spent amount through [`TestLimitModule`].
    pub fn set_limit_and_spent(&self, limit: U256, spent: U256) {
        self.invoke(
            self.owner.address(),
            LIMIT_TEST_MODULE,
            self.payload(*SET_LIMIT_AND_SPENT, &[Token::Uint(limit), Token::Uint(spent)]),
            TIMESTAMP,
        )
        .expect("limit set");
    }

    /// Current wallet record.
    pub fn wallet(&self) -> WalletRecord {
        self.engine.ledger().wallet(&WALLET).expect("wallet exists")
    }

    /// Base-asset balance of `holder`.
    pub fn base_balance(&self, holder: Address) -> U256 {
        self.engine.ledger().balance_of(&holder, Asset::Base)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
