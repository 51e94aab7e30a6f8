//! Operation factory.
//!
//! A transfer of the native asset to an address that does not exist yet
//! creates it, with the transferred amount as its starting balance. Credit
//! assets cannot do that, so paying one to a missing account is refused
//! before anything gets built.

use tracing::debug;

use crate::error::WalletError;
use crate::gateway::LedgerGateway;
use crate::transaction::types::{Amount, Asset, Operation};

/// Build the operation that moves `amount` of `asset` to `destination`.
///
/// Yields `Payment` when the destination exists and `CreateAccount` when it
/// does not and the asset is native. A gateway failure is propagated as is:
/// guessing "exists" or "missing" would produce an operation the ledger
/// rejects.
pub async fn create_payment_operation<G>(
    gateway: &G,
    amount: Amount,
    asset: &Asset,
    destination: &str,
) -> Result<Operation, WalletError>
where
    G: LedgerGateway + ?Sized,
{
    let exists = gateway.account_exists(destination).await?;

    if exists {
        return Ok(Operation::payment(destination, asset.clone(), amount));
    }

    if !asset.is_native() {
        return Err(WalletError::NonExistentDestination {
            asset_code: asset.code().to_string(),
            destination: destination.to_string(),
        });
    }

    debug!(destination, %amount, "destination missing, creating account");
    Ok(Operation::create_account(destination, amount))
}
