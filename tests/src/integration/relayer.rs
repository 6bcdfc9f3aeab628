//! # Relay Pipeline Scenarios
//!
//! Every rejection path of the relay pipeline, replay protection, and the
//! `success = false` outcome of a module that refuses the call.

#[cfg(test)]
mod tests {
    use crate::support::*;
    use ks_02_relay_engine::prelude::*;
    use ks_03_wallet_modules::recovery_manager::FINALIZE_RECOVERY;
    use shared_types::{Address, Token};

    fn set_int(world: &World, value: u64) -> CallData {
        world.payload(*SET_INT, &[Token::Uint(U256::from(value))])
    }

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[test]
    fn test_owner_relay_executes_module() {
        let world = World::new();
        let outcome = world.owner_relay(TEST_MODULE, set_int(&world, 3)).unwrap();

        assert!(outcome.success);
        assert!(outcome.refund.is_none());
        assert_eq!(TestModule::stored_int(world.engine.ledger(), WALLET), U256::from(3u64));

        let executed = world.events.named("TransactionExecuted");
        assert_eq!(executed.len(), 1);
        match &executed[0] {
            RelayEvent::TransactionExecuted {
                success,
                sign_hash,
                correlation_id,
                ..
            } => {
                assert!(*success);
                assert_eq!(*sign_hash, outcome.sign_hash);
                assert_eq!(*correlation_id, outcome.correlation_id);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_nonce_updated_after_relay() {
        let world = World::new();
        let request = world.signed(world.request(TEST_MODULE, set_int(&world, 1)), &[&world.owner]);
        let nonce = request.nonce;
        world.relay(request).unwrap();
        assert_eq!(world.engine.current_nonce(&WALLET), Ok(nonce));
    }

    // =========================================================================
    // REJECTIONS BEFORE EXECUTION
    // =========================================================================

    #[test]
    fn test_short_payload_rejected() {
        let world = World::new();
        let err = world
            .owner_relay(TEST_MODULE, CallData::from_bytes(vec![0x01, 0x02, 0x03]))
            .unwrap_err();
        assert_eq!(err, RelayError::WalletMismatch);
    }

    #[test]
    fn test_unattached_module_rejected() {
        let world = World::new();
        let payload = world.payload(*SET_INT, &[Token::Uint(U256::one())]);
        let err = world.owner_relay(SPARE_MODULE, payload).unwrap_err();
        assert_eq!(err, RelayError::ModuleNotAuthorized { module: SPARE_MODULE });
    }

    #[test]
    fn test_first_argument_must_be_wallet() {
        let world = World::new();
        let payload = CallData::encode(
            *SET_INT,
            &[Token::Address(Address::from_low_u64(0xdead)), Token::Uint(U256::one())],
        );
        let err = world.owner_relay(TEST_MODULE, payload).unwrap_err();
        assert_eq!(err, RelayError::WalletMismatch);
    }

    #[test]
    fn test_attached_gas_below_limit_rejected() {
        let world = World::new();
        let request = world.signed(world.request(TEST_MODULE, set_int(&world, 1)), &[&world.owner]);
        let mut submission = world.submission();
        submission.gas_available = GAS_LIMIT * 9 / 10;

        let err = world.engine.relay(request, submission).unwrap_err();
        assert_eq!(
            err,
            RelayError::InsufficientGas {
                required: GAS_LIMIT,
                available: GAS_LIMIT * 9 / 10,
            }
        );
        assert_eq!(world.engine.current_nonce(&WALLET), Ok(Nonce::ZERO));
    }

    #[test]
    fn test_relay_into_engine_is_disabled() {
        let world = World::new();
        let selector = Selector::from_signature(
            "execute(address,address,bytes,uint256,bytes,uint256,uint256,address,address)",
        );
        let engine = world.engine.address();
        let err = world.owner_relay(engine, world.payload(selector, &[])).unwrap_err();
        assert_eq!(
            err,
            RelayError::DisabledMethod {
                module: engine,
                selector,
            }
        );
    }

    #[test]
    fn test_zero_signature_descriptor_must_exclude_owner() {
        let world = World::new();
        let request = world.request(BAD_MODULE, set_int(&world, 1));
        let err = world.relay(request).unwrap_err();
        assert!(matches!(err, RelayError::MalformedDescriptor { required: 0, .. }));
    }

    #[test]
    fn test_wrong_signature_count_leaves_state_untouched() {
        let world = World::new();
        let stranger = TestSigner::random();
        let request = world.signed(
            world.request(TEST_MODULE, set_int(&world, 1)),
            &[&world.owner, &stranger],
        );
        let err = world.relay(request).unwrap_err();
        assert_eq!(err, RelayError::WrongSignatureCount { expected: 1, actual: 2 });
        assert_eq!(world.engine.current_nonce(&WALLET), Ok(Nonce::ZERO));
        assert_eq!(TestModule::stored_int(world.engine.ledger(), WALLET), U256::zero());
    }

    #[test]
    fn test_owner_must_sign_first() {
        let world = World::new();
        let stranger = TestSigner::random();
        let request = world.signed(world.request(TEST_MODULE, set_int(&world, 1)), &[&stranger]);
        assert_eq!(
            world.relay(request).unwrap_err(),
            RelayError::OwnerSignaturePositionViolated
        );
    }

    #[test]
    fn test_signature_over_other_request_rejected() {
        let world = World::new();
        let mut request = world.signed(world.request(TEST_MODULE, set_int(&world, 1)), &[&world.owner]);
        request.gas_limit -= 1;
        assert_eq!(
            world.relay(request).unwrap_err(),
            RelayError::OwnerSignaturePositionViolated
        );
    }

    #[test]
    fn test_rejection_is_idempotent() {
        let world = World::new();
        let stranger = TestSigner::random();
        let request = world.signed(world.request(TEST_MODULE, set_int(&world, 1)), &[&stranger]);

        let first = world.relay(request.clone()).unwrap_err();
        let second = world.relay(request).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(world.engine.stats().relays_rejected, 2);
        assert_eq!(world.engine.current_nonce(&WALLET), Ok(Nonce::ZERO));
    }

    // =========================================================================
    // REPLAY PROTECTION
    // =========================================================================

    #[test]
    fn test_duplicate_request_rejected() {
        let world = World::new();
        let request = world.signed(world.request(TEST_MODULE, set_int(&world, 1)), &[&world.owner]);
        world.relay(request.clone()).unwrap();
        assert_eq!(world.relay(request).unwrap_err(), RelayError::DuplicateOrStaleNonce);
        assert_eq!(world.events.named("TransactionExecuted").len(), 1);
    }

    #[test]
    fn test_nonce_ordering_within_and_across_blocks() {
        let world = World::new();
        let relay_with = |nonce: Nonce| {
            let mut request = world.request(TEST_MODULE, set_int(&world, 1));
            request.nonce = nonce;
            world.relay(world.signed(request, &[&world.owner]))
        };

        relay_with(Nonce::new(5, 2)).unwrap();
        assert_eq!(relay_with(Nonce::new(5, 2)).unwrap_err(), RelayError::DuplicateOrStaleNonce);
        relay_with(Nonce::new(5, 3)).unwrap();
        assert_eq!(relay_with(Nonce::new(4, 99)).unwrap_err(), RelayError::DuplicateOrStaleNonce);
        assert_eq!(world.engine.current_nonce(&WALLET), Ok(Nonce::new(5, 3)));
    }

    #[test]
    fn test_nonce_far_in_future_rejected() {
        let world = World::new();
        let mut request = world.request(TEST_MODULE, set_int(&world, 1));
        let bound = world.engine.config().nonce_block_bound;
        request.nonce = Nonce::new(u128::from(BLOCK + bound + 1), 1);
        let request = world.signed(request, &[&world.owner]);
        assert_eq!(world.relay(request).unwrap_err(), RelayError::DuplicateOrStaleNonce);
    }

    #[test]
    fn test_unsigned_request_leaves_owner_nonce_alone() {
        let world = World::new();
        let bound = world.engine.config().nonce_block_bound;
        let mut request = world.request(RECOVERY_MANAGER, world.payload(*FINALIZE_RECOVERY, &[]));
        request.nonce = Nonce::new(u128::from(BLOCK + bound), 0);

        let outcome = world.relay(request.clone()).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error_detail.as_deref(), Some("no ongoing recovery"));
        assert_eq!(world.engine.current_nonce(&WALLET), Ok(Nonce::ZERO));

        // The same unsigned request runs at most once.
        assert_eq!(world.relay(request).unwrap_err(), RelayError::DuplicateOrStaleNonce);

        let owner = world.owner_relay(TEST_MODULE, set_int(&world, 4)).unwrap();
        assert!(owner.success, "{:?}", owner.error_detail);
        assert_eq!(TestModule::stored_int(world.engine.ledger(), WALLET), U256::from(4u64));
    }

    // =========================================================================
    // MODULE FAILURES
    // =========================================================================

    #[test]
    fn test_engine_not_attached_reports_module_failure() {
        let world = World::without_engine();
        let outcome = world.owner_relay(TEST_MODULE, set_int(&world, 3)).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.error_detail.as_deref(), Some("must be owner or module"));
        assert_eq!(TestModule::stored_int(world.engine.ledger(), WALLET), U256::zero());
        // The nonce is consumed even though the module refused.
        assert_eq!(world.engine.current_nonce(&WALLET), Ok(Nonce::new(u128::from(BLOCK), 1)));
        assert_eq!(world.engine.stats().module_failures, 1);
    }

    #[test]
    fn test_direct_owner_call_needs_no_engine() {
        let world = World::without_engine();
        world
            .invoke(world.owner.address(), TEST_MODULE, set_int(&world, 9), TIMESTAMP)
            .unwrap();
        assert_eq!(TestModule::stored_int(world.engine.ledger(), WALLET), U256::from(9u64));
    }
}
