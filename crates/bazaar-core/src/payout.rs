//! # Payout Balance Transitions
//!
//! The merchant balance trigger is a transition trigger: it fires only when a
//! payout's status crosses the `Completed` boundary, not on every write.
//! Making the transition an explicit value (instead of comparing fields inline
//! at each call site) keeps the "at most one signed delta per call" rule easy
//! to uphold.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::PayoutStatus;

/// The balance side effect of one payout status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceEffect {
    /// No boundary crossed; the balance is untouched even if other payout
    /// fields (including the amount) changed in the same write.
    None,
    /// Payout became completed: the amount owed to the merchant decreases.
    Settle,
    /// Payout stopped being completed: the amount owed is restored.
    Reinstate,
}

impl BalanceEffect {
    /// Computes the effect of moving a payout from `before` to `after`.
    pub fn for_transition(before: PayoutStatus, after: PayoutStatus) -> Self {
        match (
            before == PayoutStatus::Completed,
            after == PayoutStatus::Completed,
        ) {
            (false, true) => BalanceEffect::Settle,
            (true, false) => BalanceEffect::Reinstate,
            _ => BalanceEffect::None,
        }
    }

    /// The effect of creating a payout directly in `status`.
    pub fn for_creation(status: PayoutStatus) -> Self {
        match status {
            PayoutStatus::Completed => BalanceEffect::Settle,
            _ => BalanceEffect::None,
        }
    }

    /// The effect of deleting a payout currently in `status`.
    pub fn for_deletion(status: PayoutStatus) -> Self {
        match status {
            PayoutStatus::Completed => BalanceEffect::Reinstate,
            _ => BalanceEffect::None,
        }
    }

    /// The signed delta to apply to `current_balance` for a payout of
    /// `amount`. Zero for [`BalanceEffect::None`].
    pub fn balance_delta(&self, amount: Money) -> Money {
        match self {
            BalanceEffect::None => Money::zero(),
            BalanceEffect::Settle => amount.negate(),
            BalanceEffect::Reinstate => amount,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use PayoutStatus::{Completed, Failed, Pending};

    #[test]
    fn test_transitions_into_completed_settle() {
        assert_eq!(
            BalanceEffect::for_transition(Pending, Completed),
            BalanceEffect::Settle
        );
        assert_eq!(
            BalanceEffect::for_transition(Failed, Completed),
            BalanceEffect::Settle
        );
    }

    #[test]
    fn test_transitions_out_of_completed_reinstate() {
        assert_eq!(
            BalanceEffect::for_transition(Completed, Pending),
            BalanceEffect::Reinstate
        );
        assert_eq!(
            BalanceEffect::for_transition(Completed, Failed),
            BalanceEffect::Reinstate
        );
    }

    #[test]
    fn test_no_op_transitions() {
        // Staying in place fires nothing, including completed -> completed.
        for status in [Pending, Completed, Failed] {
            assert_eq!(
                BalanceEffect::for_transition(status, status),
                BalanceEffect::None
            );
        }
        // Moving between the two non-completed states fires nothing.
        assert_eq!(
            BalanceEffect::for_transition(Pending, Failed),
            BalanceEffect::None
        );
        assert_eq!(
            BalanceEffect::for_transition(Failed, Pending),
            BalanceEffect::None
        );
    }

    #[test]
    fn test_creation_and_deletion() {
        assert_eq!(BalanceEffect::for_creation(Completed), BalanceEffect::Settle);
        assert_eq!(BalanceEffect::for_creation(Pending), BalanceEffect::None);
        assert_eq!(BalanceEffect::for_creation(Failed), BalanceEffect::None);

        assert_eq!(
            BalanceEffect::for_deletion(Completed),
            BalanceEffect::Reinstate
        );
        assert_eq!(BalanceEffect::for_deletion(Pending), BalanceEffect::None);
    }

    #[test]
    fn test_balance_delta_sign() {
        let amount = Money::from_paisa(20000);
        assert_eq!(
            BalanceEffect::Settle.balance_delta(amount).paisa(),
            -20000
        );
        assert_eq!(
            BalanceEffect::Reinstate.balance_delta(amount).paisa(),
            20000
        );
        assert!(BalanceEffect::None.balance_delta(amount).is_zero());
    }
}
