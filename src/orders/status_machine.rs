use crate::orders::LineStatus;

/// Service for validating kitchen line-status transitions
///
/// The core only guards transitions it is asked to make; statuses written
/// by the kitchen display that the core does not manage are left untouched.
pub struct LineStatusMachine;

impl LineStatusMachine {
    /// Check if a line-status transition is valid
    ///
    /// # Valid Transitions
    /// - Ordered → Ready, Cancelled
    /// - Ready → Delivered, Cancelled
    /// - Delivered, Cancelled → (terminal, no transitions)
    /// - Any status → Same status (idempotent)
    pub fn is_valid_transition(from: LineStatus, to: LineStatus) -> bool {
        // Same status is always valid (idempotent)
        if from == to {
            return true;
        }

        match (from, to) {
            (LineStatus::Ordered, LineStatus::Ready) => true,
            (LineStatus::Ordered, LineStatus::Cancelled) => true,

            (LineStatus::Ready, LineStatus::Delivered) => true,
            (LineStatus::Ready, LineStatus::Cancelled) => true,

            // Delivered and Cancelled are terminal
            _ => false,
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(from: LineStatus, to: LineStatus) -> Result<LineStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid line status transition from {} to {}", from, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_to_ready() {
        assert!(LineStatusMachine::is_valid_transition(
            LineStatus::Ordered,
            LineStatus::Ready
        ));
    }

    #[test]
    fn test_ordered_to_cancelled() {
        assert!(LineStatusMachine::is_valid_transition(
            LineStatus::Ordered,
            LineStatus::Cancelled
        ));
    }

    #[test]
    fn test_ready_to_delivered() {
        assert!(LineStatusMachine::is_valid_transition(
            LineStatus::Ready,
            LineStatus::Delivered
        ));
    }

    #[test]
    fn test_ready_to_cancelled() {
        assert!(LineStatusMachine::is_valid_transition(
            LineStatus::Ready,
            LineStatus::Cancelled
        ));
    }

    #[test]
    fn test_ordered_cannot_skip_to_delivered() {
        assert!(!LineStatusMachine::is_valid_transition(
            LineStatus::Ordered,
            LineStatus::Delivered
        ));
    }

    #[test]
    fn test_delivered_is_terminal() {
        assert!(!LineStatusMachine::is_valid_transition(
            LineStatus::Delivered,
            LineStatus::Ordered
        ));
        assert!(!LineStatusMachine::is_valid_transition(
            LineStatus::Delivered,
            LineStatus::Ready
        ));
        assert!(!LineStatusMachine::is_valid_transition(
            LineStatus::Delivered,
            LineStatus::Cancelled
        ));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(!LineStatusMachine::is_valid_transition(
            LineStatus::Cancelled,
            LineStatus::Ordered
        ));
        assert!(!LineStatusMachine::is_valid_transition(
            LineStatus::Cancelled,
            LineStatus::Ready
        ));
        assert!(!LineStatusMachine::is_valid_transition(
            LineStatus::Cancelled,
            LineStatus::Delivered
        ));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!LineStatusMachine::is_valid_transition(
            LineStatus::Ready,
            LineStatus::Ordered
        ));
    }

    #[test]
    fn test_transition_valid() {
        let result = LineStatusMachine::transition(LineStatus::Ordered, LineStatus::Ready);
        assert_eq!(result.unwrap(), LineStatus::Ready);
    }

    #[test]
    fn test_transition_invalid() {
        let result = LineStatusMachine::transition(LineStatus::Ordered, LineStatus::Delivered);
        assert!(result.unwrap_err().contains("Invalid line status transition"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn line_status_strategy() -> impl Strategy<Value = LineStatus> {
        prop_oneof![
            Just(LineStatus::Ordered),
            Just(LineStatus::Ready),
            Just(LineStatus::Delivered),
            Just(LineStatus::Cancelled),
        ]
    }

    /// Same-status transitions are always valid (idempotent)
    #[test]
    fn prop_same_status_is_valid() {
        proptest!(|(status in line_status_strategy())| {
            prop_assert!(LineStatusMachine::is_valid_transition(status, status));
        });
    }

    /// Terminal states accept no transition except to themselves
    #[test]
    fn prop_terminal_states_absorb() {
        proptest!(|(to in line_status_strategy())| {
            for terminal in [LineStatus::Delivered, LineStatus::Cancelled] {
                if to != terminal {
                    prop_assert!(!LineStatusMachine::is_valid_transition(terminal, to));
                }
            }
        });
    }

    /// transition() agrees with is_valid_transition() everywhere
    #[test]
    fn prop_transition_consistency() {
        proptest!(|(
            from in line_status_strategy(),
            to in line_status_strategy()
        )| {
            let is_valid = LineStatusMachine::is_valid_transition(from, to);
            let result = LineStatusMachine::transition(from, to);
            if is_valid {
                prop_assert_eq!(result.unwrap(), to);
            } else {
                prop_assert!(result.is_err());
            }
        });
    }
}
