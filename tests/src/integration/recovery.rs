//! # Recovery Scenarios
//!
//! Guardian quorums driving the `RecoveryManager`: signer placement and
//! ordering rules, the recovery period, and cancellation.

#[cfg(test)]
mod tests {
    use crate::support::*;
    use ks_02_relay_engine::prelude::*;
    use ks_03_wallet_modules::recovery_manager::{
        CANCEL_RECOVERY, DEFAULT_RECOVERY_PERIOD_SECS, EXECUTE_RECOVERY, FINALIZE_RECOVERY,
    };
    use shared_types::Token;

    struct Recovery {
        world: World,
        guardians: Vec<TestSigner>,
        new_owner: TestSigner,
    }

    fn with_guardians(count: usize) -> Recovery {
        let world = World::new();
        let guardians = sorted_signers(count);
        world.add_guardians(&guardians.iter().collect::<Vec<_>>());
        Recovery {
            world,
            guardians,
            new_owner: TestSigner::random(),
        }
    }

    impl Recovery {
        fn execute_request(&self, signers: &[&TestSigner]) -> RelayRequest {
            let payload = self.world.payload(
                *EXECUTE_RECOVERY,
                &[Token::Address(self.new_owner.address())],
            );
            self.world
                .signed(self.world.request(RECOVERY_MANAGER, payload), signers)
        }

        fn start(&self) {
            let outcome = self
                .world
                .relay(self.execute_request(&[&self.guardians[0]]))
                .unwrap();
            assert!(outcome.success, "{:?}", outcome.error_detail);
        }

        fn cancel(&self, signers: &[&TestSigner]) -> Result<RelayOutcome, RelayError> {
            let payload = self.world.payload(*CANCEL_RECOVERY, &[]);
            let request = self
                .world
                .signed(self.world.request(RECOVERY_MANAGER, payload), signers);
            self.world.relay(request)
        }

        fn finalize_at(&self, timestamp: u64) -> RelayOutcome {
            let payload = self.world.payload(*FINALIZE_RECOVERY, &[]);
            let request = self.world.request(RECOVERY_MANAGER, payload);
            self.world
                .engine
                .relay(request, self.world.submission_at(timestamp))
                .unwrap()
        }
    }

    // =========================================================================
    // EXECUTE
    // =========================================================================

    #[test]
    fn test_guardian_majority_starts_recovery_without_refund() {
        let r = with_guardians(2);
        let mut request = r.execute_request(&[]);
        request.gas_price = U256::from(GAS_PRICE);
        let request = r.world.signed(request, &[&r.guardians[0]]);

        let outcome = r.world.relay(request).unwrap();
        assert!(outcome.success, "{:?}", outcome.error_detail);
        assert!(outcome.refund.is_none());
        assert_eq!(r.world.base_balance(RELAYER), U256::zero());
        assert_eq!(r.world.events.named("RecoveryExecuted").len(), 1);
    }

    #[test]
    fn test_owner_may_not_sign_recovery() {
        let r = with_guardians(2);
        let err = r.world.relay(r.execute_request(&[&r.world.owner])).unwrap_err();
        assert_eq!(err, RelayError::OwnerSignaturePresentWhenForbidden);
    }

    #[test]
    fn test_stranger_may_not_sign_recovery() {
        let r = with_guardians(2);
        let stranger = TestSigner::random();
        let err = r.world.relay(r.execute_request(&[&stranger])).unwrap_err();
        assert_eq!(
            err,
            RelayError::UnauthorizedSigner {
                signer: stranger.address()
            }
        );
    }

    #[test]
    fn test_recovery_cannot_be_started_directly() {
        let r = with_guardians(1);
        let payload = r
            .world
            .payload(*EXECUTE_RECOVERY, &[Token::Address(r.new_owner.address())]);
        let guardian = r.guardians[0].address();
        let err = r
            .world
            .invoke(guardian, RECOVERY_MANAGER, payload, TIMESTAMP)
            .unwrap_err();
        assert_eq!(err, RelayError::UnauthorizedCaller { caller: guardian });
    }

    #[test]
    fn test_recovery_needs_guardians() {
        let r = with_guardians(0);
        let err = r.world.relay(r.execute_request(&[])).unwrap_err();
        assert_eq!(
            err,
            RelayError::UnsupportedOperation {
                module: RECOVERY_MANAGER,
                selector: *EXECUTE_RECOVERY,
            }
        );
    }

    #[test]
    fn test_second_recovery_rejected_while_pending() {
        let r = with_guardians(2);
        r.start();
        let outcome = r.world.relay(r.execute_request(&[&r.guardians[1]])).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error_detail.as_deref(), Some("ongoing recovery"));
    }

    // =========================================================================
    // FINALIZE
    // =========================================================================

    #[test]
    fn test_finalize_waits_for_recovery_period() {
        let r = with_guardians(2);
        r.start();

        let early = r.finalize_at(TIMESTAMP + DEFAULT_RECOVERY_PERIOD_SECS - 1);
        assert!(!early.success);
        assert_eq!(early.error_detail.as_deref(), Some("recovery period not elapsed"));
        assert_eq!(r.world.wallet().owner, r.world.owner.address());

        let done = r.finalize_at(TIMESTAMP + DEFAULT_RECOVERY_PERIOD_SECS);
        assert!(done.success, "{:?}", done.error_detail);
        assert_eq!(r.world.wallet().owner, r.new_owner.address());
        assert_eq!(r.world.events.named("OwnerChanged").len(), 1);
    }

    #[test]
    fn test_new_owner_takes_control() {
        let r = with_guardians(1);
        r.start();
        assert!(r.finalize_at(TIMESTAMP + DEFAULT_RECOVERY_PERIOD_SECS).success);

        let payload = r.world.payload(*SET_INT, &[Token::Uint(U256::from(5u64))]);
        let err = r.world.owner_relay(TEST_MODULE, payload.clone()).unwrap_err();
        assert_eq!(err, RelayError::OwnerSignaturePositionViolated);

        let request = r
            .world
            .signed(r.world.request(TEST_MODULE, payload), &[&r.new_owner]);
        assert!(r.world.relay(request).unwrap().success);
        assert_eq!(
            TestModule::stored_int(r.world.engine.ledger(), WALLET),
            U256::from(5u64)
        );
    }

    // =========================================================================
    // CANCEL
    // =========================================================================

    #[test]
    fn test_cancel_with_ascending_guardians() {
        let r = with_guardians(2);
        r.start();

        let outcome = r.cancel(&[&r.guardians[0], &r.guardians[1]]).unwrap();
        assert!(outcome.success, "{:?}", outcome.error_detail);
        assert_eq!(r.world.events.named("RecoveryCanceled").len(), 1);

        let late = r.finalize_at(TIMESTAMP + DEFAULT_RECOVERY_PERIOD_SECS);
        assert_eq!(late.error_detail.as_deref(), Some("no ongoing recovery"));
    }

    #[test]
    fn test_cancel_with_descending_guardians_rejected() {
        let r = with_guardians(2);
        r.start();

        let err = r.cancel(&[&r.guardians[1], &r.guardians[0]]).unwrap_err();
        assert_eq!(err, RelayError::SignerOrderViolated { index: 1 });
    }

    #[test]
    fn test_cancel_with_leading_owner() {
        let r = with_guardians(2);
        r.start();

        // A leading owner is exempt from the ordering rule.
        let outcome = r.cancel(&[&r.world.owner, &r.guardians[1]]).unwrap();
        assert!(outcome.success, "{:?}", outcome.error_detail);
    }

    #[test]
    fn test_cancel_with_repeated_guardian_rejected() {
        let r = with_guardians(2);
        r.start();

        let err = r.cancel(&[&r.guardians[0], &r.guardians[0]]).unwrap_err();
        assert_eq!(
            err,
            RelayError::DuplicateSigner {
                signer: r.guardians[0].address()
            }
        );
    }
}
