//! # Signature Quorum
//!
//! Checks a list of recovered signers against a module's published
//! descriptor and the wallet's guardian set. Pure: no partial state is kept
//! between calls.

use super::entities::WalletRecord;
use super::value_objects::{AuthorizationDescriptor, OwnerSignatureRequirement};
use crate::errors::RelayError;
use shared_types::Address;
use std::cmp::Ordering;

/// Descriptor sanity and signature count. Runs before any recovery work.
pub fn check_signature_count(
    descriptor: &AuthorizationDescriptor,
    supplied: usize,
) -> Result<(), RelayError> {
    descriptor.validate()?;
    if supplied != descriptor.required_signatures {
        return Err(RelayError::WrongSignatureCount {
            expected: descriptor.required_signatures,
            actual: supplied,
        });
    }
    Ok(())
}

/// Validates recovered signers, in submission order.
///
/// 1. owner placement per `owner_requirement`
/// 2. strictly ascending order, a leading owner excepted
/// 3. every other signer is a guardian
pub fn check_signers(
    descriptor: &AuthorizationDescriptor,
    signers: &[Address],
    wallet: &WalletRecord,
) -> Result<(), RelayError> {
    let owner = wallet.owner;
    let leading_owner = signers.first() == Some(&owner);

    match descriptor.owner_requirement {
        OwnerSignatureRequirement::RequiredOwnerFirst => {
            if !leading_owner || signers[1..].contains(&owner) {
                return Err(RelayError::OwnerSignaturePositionViolated);
            }
        }
        OwnerSignatureRequirement::OptionalOwner => {}
        OwnerSignatureRequirement::AnyoneButOwner => {
            if signers.contains(&owner) {
                return Err(RelayError::OwnerSignaturePresentWhenForbidden);
            }
        }
    }

    let skip = usize::from(leading_owner);
    let others = &signers[skip..];

    for (offset, pair) in others.windows(2).enumerate() {
        match pair[0].cmp(&pair[1]) {
            Ordering::Less => {}
            Ordering::Equal => return Err(RelayError::DuplicateSigner { signer: pair[1] }),
            Ordering::Greater => {
                return Err(RelayError::SignerOrderViolated {
                    index: skip + offset + 1,
                })
            }
        }
    }

    if let Some(stranger) = others.iter().find(|s| !wallet.is_guardian(s)) {
        return Err(RelayError::UnauthorizedSigner { signer: *stranger });
    }

    Ok(())
}
