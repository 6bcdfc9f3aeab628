//! # Module Management Scenarios
//!
//! Attaching modules through the `ModuleManager` and the per-module
//! `addModule` entry points, gated by the module registry.

#[cfg(test)]
mod tests {
    use crate::support::*;
    use ks_02_relay_engine::prelude::*;
    use ks_03_wallet_modules::base::ADD_MODULE;
    use shared_types::{Address, Token};

    fn add_module(world: &World, module: Address) -> CallData {
        world.payload(*ADD_MODULE, &[Token::Address(module)])
    }

    #[test]
    fn test_relayed_add_module_on_module_manager() {
        let world = World::new();
        assert!(!world.engine.is_authorized(&WALLET, &SPARE_MODULE));

        let outcome = world
            .owner_relay(MODULE_MANAGER, add_module(&world, SPARE_MODULE))
            .unwrap();
        assert!(outcome.success, "{:?}", outcome.error_detail);
        assert!(world.engine.is_authorized(&WALLET, &SPARE_MODULE));

        let authorised = world.events.named("ModuleAuthorised");
        assert_eq!(
            authorised.last(),
            Some(&RelayEvent::ModuleAuthorised {
                wallet: WALLET,
                module: SPARE_MODULE,
                value: true,
            })
        );
    }

    #[test]
    fn test_relayed_add_module_on_general_module_needs_owner() {
        let world = World::new();
        let outcome = world
            .owner_relay(GUARDIAN_MANAGER, add_module(&world, SPARE_MODULE))
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error_detail.as_deref(), Some("must be wallet owner"));
        assert!(!world.engine.is_authorized(&WALLET, &SPARE_MODULE));
    }

    #[test]
    fn test_direct_add_module_on_general_module() {
        let world = World::new();
        world
            .invoke(
                world.owner.address(),
                GUARDIAN_MANAGER,
                add_module(&world, SPARE_MODULE),
                TIMESTAMP,
            )
            .unwrap();
        assert!(world.engine.is_authorized(&WALLET, &SPARE_MODULE));
    }

    #[test]
    fn test_unregistered_module_cannot_be_added() {
        let world = World::new();
        let rogue = Address::from_low_u64(0xbad);
        let outcome = world.owner_relay(MODULE_MANAGER, add_module(&world, rogue)).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error_detail.as_deref(), Some("module is not registered"));
        assert!(!world.wallet().is_module(&rogue));
    }

    #[test]
    fn test_relayed_add_module_needs_attached_engine() {
        let world = World::without_engine();
        let outcome = world
            .owner_relay(MODULE_MANAGER, add_module(&world, SPARE_MODULE))
            .unwrap();
        assert_eq!(outcome.error_detail.as_deref(), Some("must be owner or module"));
    }

    #[test]
    fn test_registry_update_enables_new_module() {
        let world = World::new();
        let newcomer = Address::from_low_u64(0x800);
        let register = RegistryUpdate::RegisterModule {
            module: newcomer,
            name: "Newcomer".into(),
        };

        assert_eq!(
            world.engine.update_registry(&world.owner.address(), register.clone()),
            Err(AccessError::NotOwner)
        );
        world.engine.update_registry(&INFRASTRUCTURE, register).unwrap();
        assert!(world.engine.registry().is_registered(&newcomer));

        let outcome = world.owner_relay(MODULE_MANAGER, add_module(&world, newcomer)).unwrap();
        assert!(outcome.success);

        // Attached but never deployed: nothing can answer for its operations.
        let payload = world.payload(*SET_INT, &[Token::Uint(U256::one())]);
        let err = world.owner_relay(newcomer, payload).unwrap_err();
        assert_eq!(
            err,
            RelayError::UnsupportedOperation {
                module: newcomer,
                selector: *SET_INT,
            }
        );
    }

    #[test]
    fn test_deregistered_module_stays_attached() {
        let world = World::new();
        world
            .engine
            .update_registry(&INFRASTRUCTURE, RegistryUpdate::DeregisterModule { module: TEST_MODULE })
            .unwrap();

        assert!(world.engine.is_authorized(&WALLET, &TEST_MODULE));
        let outcome = world
            .owner_relay(TEST_MODULE, world.payload(*SET_INT, &[Token::Uint(U256::one())]))
            .unwrap();
        assert!(outcome.success);
        assert_eq!(world.events.named("RegistryUpdated").len(), 1);
    }

    #[test]
    fn test_wallet_initialisation_rules() {
        let world = World::new();
        assert_eq!(
            world.engine.init_wallet(WALLET, world.owner.address(), &[TEST_MODULE]),
            Err(WalletError::AlreadyInitialized)
        );

        let fresh = Address::from_low_u64(0xf2e5);
        let rogue = Address::from_low_u64(0xbad);
        assert_eq!(
            world.engine.init_wallet(fresh, world.owner.address(), &[rogue]),
            Err(WalletError::ModuleNotRegistered(rogue))
        );
        assert_eq!(
            world.engine.init_wallet(fresh, world.owner.address(), &[]),
            Err(WalletError::NoModules)
        );
        assert_eq!(
            world.engine.current_nonce(&fresh),
            Err(RelayError::UnknownWallet(fresh))
        );
    }
}
