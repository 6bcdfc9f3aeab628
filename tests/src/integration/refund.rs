//! # Refund Scenarios
//!
//! Refunds in the base asset and in a priced token, and their interaction
//! with the wallet's daily limit.

#[cfg(test)]
mod tests {
    use crate::support::*;
    use ks_02_relay_engine::prelude::*;
    use ks_03_wallet_modules::approved_transfer::APPROVED_TRANSFER as APPROVED_TRANSFER_OP;
    use shared_types::{Address, Token};

    const TOKEN_RATE: u128 = 510_000_000_000_000_000_000;

    fn refunded_request(world: &World, refund_token: Address) -> RelayRequest {
        let mut request = world.request(TEST_MODULE, world.payload(*SET_INT, &[Token::Uint(U256::from(7u64))]));
        request.gas_price = U256::from(GAS_PRICE);
        request.refund_token = refund_token;
        world.signed(request, &[&world.owner])
    }

    fn price_token(world: &World) {
        world.prices.add_manager(&INFRASTRUCTURE, INFRASTRUCTURE).unwrap();
        world
            .prices
            .set_price(&INFRASTRUCTURE, TOKEN, U256::from(TOKEN_RATE))
            .unwrap();
    }

    fn daily_limit(world: &World) -> DailyLimit {
        world.engine.daily_limit_of(&WALLET)
    }

    // =========================================================================
    // BASE ASSET
    // =========================================================================

    #[test]
    fn test_base_refund_paid_to_relayer() {
        let world = World::new();
        let wallet_before = world.base_balance(WALLET);

        let outcome = world.relay(refunded_request(&world, BASE_ASSET_ADDRESS)).unwrap();
        let receipt = outcome.refund.expect("refund paid");

        assert!(outcome.success);
        assert!(receipt.amount > U256::zero());
        assert!(receipt.gas_consumed <= GAS_LIMIT);
        assert_eq!(receipt.amount, U256::from(receipt.gas_consumed) * U256::from(GAS_PRICE));
        assert_eq!(receipt.recipient, RELAYER);
        assert_eq!(world.base_balance(RELAYER), receipt.amount);
        assert_eq!(world.base_balance(WALLET), wallet_before - receipt.amount);
        assert_eq!(world.engine.stats().refunds_paid, 1);

        let refunds = world.events.named("Refund");
        assert_eq!(refunds.len(), 1);
        assert_eq!(
            refunds[0],
            RelayEvent::Refund {
                wallet: WALLET,
                refund_address: RELAYER,
                refund_token: BASE_ASSET_ADDRESS,
                amount: receipt.amount,
            }
        );
    }

    #[test]
    fn test_refund_goes_to_signed_refund_address() {
        let world = World::new();
        let beneficiary = Address::from_low_u64(0xb0b);
        let mut request = world.request(TEST_MODULE, world.payload(*SET_INT, &[Token::Uint(U256::one())]));
        request.gas_price = U256::from(GAS_PRICE);
        request.refund_address = beneficiary;
        let request = world.signed(request, &[&world.owner]);

        let receipt = world.relay(request).unwrap().refund.unwrap();
        assert_eq!(receipt.recipient, beneficiary);
        assert_eq!(world.base_balance(beneficiary), receipt.amount);
        assert_eq!(world.base_balance(RELAYER), U256::zero());
    }

    #[test]
    fn test_refund_priced_at_lower_of_signed_and_paid_price() {
        let world = World::new();
        let mut request = world.request(TEST_MODULE, world.payload(*SET_INT, &[Token::Uint(U256::one())]));
        request.gas_price = U256::from(GAS_PRICE * 3);
        let request = world.signed(request, &[&world.owner]);

        let receipt = world.relay(request).unwrap().refund.unwrap();
        assert_eq!(receipt.amount, U256::from(receipt.gas_consumed) * U256::from(GAS_PRICE));
    }

    #[test]
    fn test_no_refund_when_module_fails() {
        let world = World::without_engine();
        let outcome = world.relay(refunded_request(&world, BASE_ASSET_ADDRESS)).unwrap();
        assert!(!outcome.success);
        assert!(outcome.refund.is_none());
        assert_eq!(world.base_balance(RELAYER), U256::zero());
    }

    #[test]
    fn test_base_refund_above_balance_fails_whole_relay() {
        let world = World::new();
        let price = U256::exp10(15);
        let mut request = world.request(TEST_MODULE, world.payload(*SET_INT, &[Token::Uint(U256::from(7u64))]));
        request.gas_price = price;
        let request = world.signed(request, &[&world.owner]);
        let mut submission = world.submission();
        submission.tx_gas_price = price;

        // At least 44k gas at 1e15 each is far beyond the 1e18 balance.
        let err = world.engine.relay(request, submission).unwrap_err();
        assert!(matches!(err, RelayError::RefundTransferFailed(_)));

        assert_eq!(TestModule::stored_int(world.engine.ledger(), WALLET), U256::zero());
        assert_eq!(world.engine.current_nonce(&WALLET), Ok(Nonce::ZERO));
        assert_eq!(world.base_balance(WALLET), U256::exp10(18));
        assert_eq!(world.base_balance(RELAYER), U256::zero());
        assert!(world.events.named("Refund").is_empty());
    }

    // =========================================================================
    // TOKEN
    // =========================================================================

    #[test]
    fn test_token_refund() {
        let world = World::new();
        price_token(&world);
        world
            .engine
            .ledger()
            .credit(WALLET, Asset::Token(TOKEN), U256::from(100_000_000_000_000u64));

        let receipt = world.relay(refunded_request(&world, TOKEN)).unwrap().refund.unwrap();
        assert_eq!(receipt.token, TOKEN);
        assert!(receipt.amount > U256::zero());
        assert_eq!(
            receipt.amount,
            receipt.base_amount * U256::from(PRICE_SCALE) / U256::from(TOKEN_RATE)
        );
        assert_eq!(
            world.engine.ledger().balance_of(&RELAYER, Asset::Token(TOKEN)),
            receipt.amount
        );
    }

    #[test]
    fn test_token_refund_above_balance_fails_whole_relay() {
        let world = World::new();
        price_token(&world);
        world.engine.ledger().credit(WALLET, Asset::Token(TOKEN), U256::from(10u64));

        let err = world.relay(refunded_request(&world, TOKEN)).unwrap_err();
        assert!(matches!(err, RelayError::RefundTransferFailed(_)));

        // Neither the module effect nor the nonce survive.
        assert_eq!(TestModule::stored_int(world.engine.ledger(), WALLET), U256::zero());
        assert_eq!(world.engine.current_nonce(&WALLET), Ok(Nonce::ZERO));
        assert!(world.events.named("TransactionExecuted").is_empty());
    }

    #[test]
    fn test_unpriced_token_refund_fails() {
        let world = World::new();
        world.engine.ledger().credit(WALLET, Asset::Token(TOKEN), U256::exp10(18));
        let err = world.relay(refunded_request(&world, TOKEN)).unwrap_err();
        assert_eq!(err, RelayError::PriceUnavailable { token: TOKEN });
    }

    // =========================================================================
    // DAILY LIMIT
    // =========================================================================

    #[test]
    fn test_refund_counts_against_daily_limit() {
        let world = World::new();
        world.set_limit_and_spent(U256::from(1_000_000_000u64), U256::from(10u64));

        let receipt = world
            .relay(refunded_request(&world, BASE_ASSET_ADDRESS))
            .unwrap()
            .refund
            .unwrap();
        assert_eq!(daily_limit(&world).daily_spent, U256::from(10u64) + receipt.base_amount);
    }

    #[test]
    fn test_refund_above_daily_limit_fails() {
        let world = World::new();
        world.set_limit_and_spent(U256::from(1_000_000_000u64), U256::from(999_999_990u64));

        let err = world.relay(refunded_request(&world, BASE_ASSET_ADDRESS)).unwrap_err();
        assert_eq!(err, RelayError::AboveDailyLimit);
        assert_eq!(daily_limit(&world).daily_spent, U256::from(999_999_990u64));
        assert_eq!(world.base_balance(RELAYER), U256::zero());
    }

    #[test]
    fn test_guardian_approved_transfer_resets_daily_spent() {
        let world = World::new();
        let guardian = TestSigner::random();
        world.add_guardians(&[&guardian]);
        world.set_limit_and_spent(U256::from(1_000_000_000u64), U256::from(10u64));

        let to = Address::from_low_u64(0xbeef);
        let payload = world.payload(
            *APPROVED_TRANSFER_OP,
            &[
                Token::Address(BASE_ASSET_ADDRESS),
                Token::Address(to),
                Token::Uint(U256::from(1_000u64)),
            ],
        );
        let mut request = world.request(APPROVED_TRANSFER, payload);
        request.gas_price = U256::from(GAS_PRICE);
        let request = world.signed(request, &[&world.owner, &guardian]);

        let outcome = world.relay(request).unwrap();
        assert!(outcome.success, "{:?}", outcome.error_detail);
        assert!(outcome.refund.is_some());
        assert_eq!(world.base_balance(to), U256::from(1_000u64));
        assert_eq!(daily_limit(&world).daily_spent, U256::zero());
    }

    #[test]
    fn test_spent_amount_never_decreases_without_approval() {
        let world = World::new();
        world.set_limit_and_spent(U256::from(1_000_000_000u64), U256::from(10u64));

        let mut previous = daily_limit(&world).daily_spent;
        for _ in 0..3 {
            world.relay(refunded_request(&world, BASE_ASSET_ADDRESS)).unwrap();
            let spent = daily_limit(&world).daily_spent;
            assert!(spent > previous);
            previous = spent;
        }
    }
}
