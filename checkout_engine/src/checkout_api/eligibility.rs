//! Purchase eligibility rules.
//!
//! Some products can only be bought by customers with a verified identity and an approved
//! purchasing credential. The rules are pure functions over the customer profile and a cart
//! line, so they can be tested without a database.

use thiserror::Error;

use crate::db_types::{CartLine, CustomerProfile, VerificationStatus};

/// Why a restricted product cannot be sold to this customer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EligibilityDenial {
    #[error("customer identity has not been verified")]
    IdentityUnverified,
    #[error("purchasing credential is {0}, but must be approved")]
    ApprovalMissing(VerificationStatus),
}

/// Checks whether the customer may buy the product on this cart line. Unrestricted products
/// always pass; restricted ones require a verified identity and an approved credential.
pub fn check_line(profile: &CustomerProfile, line: &CartLine) -> Result<(), EligibilityDenial> {
    if !line.requires_approval {
        return Ok(());
    }
    if !profile.identity_verified {
        return Err(EligibilityDenial::IdentityUnverified);
    }
    if profile.credential_status != VerificationStatus::Approved {
        return Err(EligibilityDenial::ApprovalMissing(profile.credential_status));
    }
    Ok(())
}
