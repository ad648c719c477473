//! Guard rules for membership changes and status transitions.
//!
//! These are pure checks over already-loaded records. Storage adapters call
//! them inside the same write step that applies the change, so a guard and
//! its mutation are never separated by another writer.

use crate::{
    CliqueError, CliqueResult, Group, GroupStatus, Membership, ParticipantId,
    WarmUpProgressCalculator,
};

/// The group can take membership changes at all.
///
/// With `require_forming`, only `draft`/`confirmed` groups qualify.
pub fn ensure_accepts_members(group: &Group, require_forming: bool) -> CliqueResult<()> {
    if group.status.is_terminal() || (require_forming && !group.status.is_forming()) {
        return Err(CliqueError::GroupClosed {
            group_id: group.id.clone(),
            status: group.status,
        });
    }
    ensure_unlocked(group)
}

pub fn ensure_unlocked(group: &Group) -> CliqueResult<()> {
    if group.is_locked() {
        return Err(CliqueError::GroupLocked(group.id.clone()));
    }
    Ok(())
}

/// Soft cap: one more active member must fit under `target_capacity`.
pub fn ensure_capacity(group: &Group, active_members: usize) -> CliqueResult<()> {
    if active_members >= group.target_capacity {
        return Err(CliqueError::CapacityExceeded {
            group_id: group.id.clone(),
            capacity: group.target_capacity,
        });
    }
    Ok(())
}

/// `holding` is the participant's active membership in an open group of the
/// same event, if any.
pub fn ensure_exclusive(
    participant_id: &ParticipantId,
    target: &Group,
    holding: Option<&Membership>,
) -> CliqueResult<()> {
    match holding {
        Some(current) if current.group_id != target.id => Err(CliqueError::AlreadyAssigned {
            participant_id: participant_id.clone(),
            group_id: current.group_id.clone(),
        }),
        _ => Ok(()),
    }
}

/// Both sides of a swap are movable.
pub fn ensure_swappable(
    a: &Membership,
    group_a: &Group,
    b: &Membership,
    group_b: &Group,
) -> CliqueResult<()> {
    if a.group_id == b.group_id {
        return Err(CliqueError::SameGroup(a.group_id.clone()));
    }
    for group in [group_a, group_b] {
        ensure_unlocked(group)?;
        if group.status.is_terminal() {
            return Err(CliqueError::GroupClosed {
                group_id: group.id.clone(),
                status: group.status,
            });
        }
    }
    Ok(())
}

/// Precondition evaluated atomically with a status change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionGuard {
    Unconditional,
    /// Group is locked and has at least one active member
    LockedWithMembers,
    /// Warm-up readiness meets the given percentage
    ReadinessAtLeast(u8),
    /// Every active member has responded and confirmed
    AllMembersReady,
}

impl TransitionGuard {
    /// Returns the reason the guard fails, if it does
    pub fn check(&self, group: &Group, memberships: &[Membership]) -> Result<(), String> {
        match self {
            TransitionGuard::Unconditional => Ok(()),
            TransitionGuard::LockedWithMembers => {
                if !group.is_locked() {
                    return Err("group must be locked before warm-up".to_string());
                }
                if !memberships.iter().any(Membership::is_active) {
                    return Err("group has no active members".to_string());
                }
                Ok(())
            }
            TransitionGuard::ReadinessAtLeast(required) => {
                let progress = WarmUpProgressCalculator::new(*required).compute(memberships);
                if progress.is_complete {
                    Ok(())
                } else {
                    Err(format!(
                        "readiness {}% ({}/{}) below required {}%",
                        progress.percent, progress.ready, progress.total, progress.required_percent
                    ))
                }
            }
            TransitionGuard::AllMembersReady => {
                let progress = WarmUpProgressCalculator::new(100).compute(memberships);
                if progress.total > 0 && progress.ready == progress.total {
                    Ok(())
                } else {
                    Err(format!(
                        "{} of {} members ready; approval needs all of them",
                        progress.ready, progress.total
                    ))
                }
            }
        }
    }

    /// `required_percent` only drives the automatic advance; approval
    /// always needs every active member ready.
    pub fn for_transition(from: GroupStatus, to: GroupStatus, required_percent: u8) -> Self {
        match (from, to) {
            (GroupStatus::Confirmed, GroupStatus::WarmingUp) => TransitionGuard::LockedWithMembers,
            (GroupStatus::WarmingUp, GroupStatus::ReadyForReview) => {
                TransitionGuard::ReadinessAtLeast(required_percent)
            }
            (GroupStatus::ReadyForReview, GroupStatus::Approved) => {
                TransitionGuard::AllMembersReady
            }
            _ => TransitionGuard::Unconditional,
        }
    }
}
