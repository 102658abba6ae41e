//! Recovery bounty split
//!
//! The value of a recovery transaction is a bounty pool paid from the
//! treasury as signatures arrive: 75% to the first signer, 25% to the
//! second, nothing to later signers.

use crate::multisig::address::Address;
use crate::multisig::error::VaultError;
use crate::multisig::ledger::Balances;
use crate::multisig::transaction::Transaction;

/// Percentage of the pool paid to the first signer
pub const FIRST_SIGNER_SHARE_PERCENT: u128 = 75;

/// Percentage of the pool paid to the second signer
pub const SECOND_SIGNER_SHARE_PERCENT: u128 = 25;

/// A payout made to one signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    pub signer: Address,
    /// Signing rank (0 = first)
    pub position: usize,
    pub amount: u128,
}

impl Payout {
    /// Whether this payout went to the first signer
    pub fn is_first(&self) -> bool {
        self.position == 0
    }
}

/// Apportions a recovery pool between the first and second signer
pub struct RecoveryFundSplitter;

impl RecoveryFundSplitter {
    /// Share of `value` owed to the signer at `position`
    ///
    /// Equals `value * percent / 100` rounded down, computed without
    /// overflow for any `value`.
    pub fn share_for(position: usize, value: u128) -> u128 {
        let percent = match position {
            0 => FIRST_SIGNER_SHARE_PERCENT,
            1 => SECOND_SIGNER_SHARE_PERCENT,
            _ => return 0,
        };

        value / 100 * percent + value % 100 * percent / 100
    }

    /// Pay a signer their share of the transaction's pool
    ///
    /// Returns `None` for signers past the second. The signer must already
    /// be recorded on the transaction.
    ///
    /// # Errors
    /// `InsufficientTreasury` if the treasury cannot cover the share; the
    /// ledger is left unchanged.
    pub fn distribute(
        balances: &mut Balances,
        transaction: &Transaction,
        signer: &Address,
    ) -> Result<Option<Payout>, VaultError> {
        let position =
            transaction
                .signer_position(signer)
                .ok_or_else(|| VaultError::NotSigner {
                    id: transaction.id,
                    guardian: signer.clone(),
                })?;

        let amount = Self::share_for(position, transaction.value);
        if amount == 0 {
            return Ok(None);
        }

        balances.move_from_treasury(signer, amount)?;

        log::info!(
            "Recovery #{}: paid {} to signer {} (rank {})",
            transaction.id,
            amount,
            signer,
            position + 1
        );

        Ok(Some(Payout {
            signer: signer.clone(),
            position,
            amount,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recovery_tx(value: u128, signers: &[&str]) -> Transaction {
        let mut tx = Transaction::new(0, Address::from("dest"), value, vec![], true);
        tx.signers = signers.iter().map(|s| Address::from(*s)).collect();
        tx
    }

    #[test]
    fn test_shares() {
        assert_eq!(RecoveryFundSplitter::share_for(0, 100), 75);
        assert_eq!(RecoveryFundSplitter::share_for(1, 100), 25);
        assert_eq!(RecoveryFundSplitter::share_for(2, 100), 0);

        // Integer math rounds down, never paying out more than the pool
        let first = RecoveryFundSplitter::share_for(0, 101);
        let second = RecoveryFundSplitter::share_for(1, 101);
        assert_eq!((first, second), (75, 25));
        assert!(first + second <= 101);
        assert_eq!(RecoveryFundSplitter::share_for(0, 199), 149);
    }

    #[test]
    fn test_shares_of_largest_pool() {
        let first = RecoveryFundSplitter::share_for(0, u128::MAX);
        let second = RecoveryFundSplitter::share_for(1, u128::MAX);

        // u128::MAX ends in ...455
        assert_eq!(first, u128::MAX / 100 * 75 + 41);
        assert_eq!(second, u128::MAX / 100 * 25 + 13);
        assert!(first <= u128::MAX - second);
    }

    #[test]
    fn test_distribute_first_and_second() {
        let mut balances = Balances::new(Address::from("vault"));
        balances.deposit(100).unwrap();
        let tx = recovery_tx(100, &["a", "b", "c"]);

        let first = RecoveryFundSplitter::distribute(&mut balances, &tx, &Address::from("a"))
            .unwrap()
            .unwrap();
        assert!(first.is_first());
        assert_eq!(first.amount, 75);

        let second = RecoveryFundSplitter::distribute(&mut balances, &tx, &Address::from("b"))
            .unwrap()
            .unwrap();
        assert!(!second.is_first());
        assert_eq!(second.amount, 25);

        let third =
            RecoveryFundSplitter::distribute(&mut balances, &tx, &Address::from("c")).unwrap();
        assert!(third.is_none());

        assert_eq!(balances.balance_of(&Address::from("a")), 75);
        assert_eq!(balances.balance_of(&Address::from("b")), 25);
        assert_eq!(balances.balance_of(&Address::from("c")), 0);
        assert_eq!(balances.treasury_balance(), 0);
    }

    #[test]
    fn test_distribute_insufficient_treasury() {
        let mut balances = Balances::new(Address::from("vault"));
        balances.deposit(10).unwrap();
        let tx = recovery_tx(100, &["a"]);

        let result = RecoveryFundSplitter::distribute(&mut balances, &tx, &Address::from("a"));
        assert_eq!(
            result,
            Err(VaultError::InsufficientTreasury { have: 10, need: 75 })
        );
        assert_eq!(balances.treasury_balance(), 10);
    }

    #[test]
    fn test_distribute_requires_signer() {
        let mut balances = Balances::new(Address::from("vault"));
        balances.deposit(100).unwrap();
        let tx = recovery_tx(100, &["a"]);

        let result = RecoveryFundSplitter::distribute(&mut balances, &tx, &Address::from("z"));
        assert!(matches!(result, Err(VaultError::NotSigner { .. })));
    }
}
