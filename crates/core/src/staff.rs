//! Staff availability states and the transition rules shared by booking
//! lifecycle code and manual (admin) changes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const AVAILABILITY_AVAILABLE: &str = "available";
pub const AVAILABILITY_OCCUPIED: &str = "occupied";
pub const AVAILABILITY_RESTING: &str = "resting";
pub const AVAILABILITY_INACTIVE: &str = "inactive";

/// All valid availability values, matching the `staff_members` CHECK constraint.
pub const VALID_AVAILABILITIES: &[&str] = &[
    AVAILABILITY_AVAILABLE,
    AVAILABILITY_OCCUPIED,
    AVAILABILITY_RESTING,
    AVAILABILITY_INACTIVE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffAvailability {
    Available,
    Occupied,
    Resting,
    Inactive,
}

impl StaffAvailability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => AVAILABILITY_AVAILABLE,
            Self::Occupied => AVAILABILITY_OCCUPIED,
            Self::Resting => AVAILABILITY_RESTING,
            Self::Inactive => AVAILABILITY_INACTIVE,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            AVAILABILITY_AVAILABLE => Ok(Self::Available),
            AVAILABILITY_OCCUPIED => Ok(Self::Occupied),
            AVAILABILITY_RESTING => Ok(Self::Resting),
            AVAILABILITY_INACTIVE => Ok(Self::Inactive),
            other => Err(CoreError::Validation(format!(
                "Unknown staff availability: '{other}'. Valid values: {}",
                VALID_AVAILABILITIES.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for StaffAvailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of evaluating a transition against the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The state must be written.
    Changed {
        from: StaffAvailability,
        to: StaffAvailability,
    },
    /// Nothing to write. Repeating a transition always lands here.
    Unchanged,
    /// The transition is not allowed; the reason is reported to the caller.
    Rejected(String),
}

/// Evaluate a transition requested by booking lifecycle code.
///
/// Booking code only ever asks for `occupied` (assigned) or `available`
/// (released). `held_elsewhere` tells whether another in-progress booking
/// still assigns this staff member; a release is then a no-op so shared
/// staff stay occupied until their last booking lets go.
pub fn booking_transition(
    current: StaffAvailability,
    target: StaffAvailability,
    held_elsewhere: bool,
) -> TransitionOutcome {
    use StaffAvailability::*;

    match (current, target) {
        (_, Resting | Inactive) => TransitionOutcome::Rejected(format!(
            "booking lifecycle cannot set availability to {target}"
        )),
        (Inactive, Occupied) => {
            TransitionOutcome::Rejected("staff member is inactive".to_string())
        }
        // Releasing never reactivates an inactive member.
        (Inactive, Available) => TransitionOutcome::Unchanged,
        (_, Available) if held_elsewhere => TransitionOutcome::Unchanged,
        (from, to) if from == to => TransitionOutcome::Unchanged,
        (from, to) => TransitionOutcome::Changed { from, to },
    }
}

/// Evaluate a manual transition (rest breaks, deactivation, return to work).
///
/// `occupied` is reserved for booking assignment and cannot be set by hand.
pub fn manual_transition(current: StaffAvailability, target: StaffAvailability) -> TransitionOutcome {
    if target == StaffAvailability::Occupied {
        return TransitionOutcome::Rejected(
            "availability 'occupied' is only set by booking assignment".into(),
        );
    }
    if current == target {
        return TransitionOutcome::Unchanged;
    }
    TransitionOutcome::Changed {
        from: current,
        to: target,
    }
}

#[cfg(test)]
mod tests {
    use super::StaffAvailability::*;
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn string_round_trip_for_every_state() {
        for s in VALID_AVAILABILITIES {
            assert_eq!(StaffAvailability::parse(s).unwrap().as_str(), *s);
        }
        assert_matches!(StaffAvailability::parse("busy"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn assigning_available_staff_occupies_them() {
        assert_eq!(
            booking_transition(Available, Occupied, false),
            TransitionOutcome::Changed {
                from: Available,
                to: Occupied
            }
        );
        assert_eq!(
            booking_transition(Resting, Occupied, false),
            TransitionOutcome::Changed {
                from: Resting,
                to: Occupied
            }
        );
    }

    #[test]
    fn repeated_transitions_are_no_ops() {
        assert_eq!(booking_transition(Occupied, Occupied, false), TransitionOutcome::Unchanged);
        assert_eq!(booking_transition(Available, Available, false), TransitionOutcome::Unchanged);
    }

    #[test]
    fn release_is_skipped_while_another_booking_holds_the_staff() {
        assert_eq!(booking_transition(Occupied, Available, true), TransitionOutcome::Unchanged);
        assert_eq!(
            booking_transition(Occupied, Available, false),
            TransitionOutcome::Changed {
                from: Occupied,
                to: Available
            }
        );
    }

    #[test]
    fn inactive_staff_are_never_touched_by_bookings() {
        assert_matches!(
            booking_transition(Inactive, Occupied, false),
            TransitionOutcome::Rejected(_)
        );
        assert_eq!(booking_transition(Inactive, Available, false), TransitionOutcome::Unchanged);
    }

    #[test]
    fn booking_code_cannot_request_rest_or_deactivation() {
        assert_matches!(
            booking_transition(Available, Resting, false),
            TransitionOutcome::Rejected(_)
        );
        assert_matches!(
            booking_transition(Occupied, Inactive, false),
            TransitionOutcome::Rejected(_)
        );
    }

    #[test]
    fn manual_transitions_cannot_occupy() {
        assert_matches!(manual_transition(Available, Occupied), TransitionOutcome::Rejected(_));
        assert_eq!(
            manual_transition(Occupied, Resting),
            TransitionOutcome::Changed {
                from: Occupied,
                to: Resting
            }
        );
        assert_eq!(manual_transition(Inactive, Inactive), TransitionOutcome::Unchanged);
    }
}
