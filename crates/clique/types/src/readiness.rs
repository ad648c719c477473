//! Warm-up readiness computation

use crate::Membership;
use serde::{Deserialize, Serialize};

/// Readiness snapshot for one group
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmUpProgress {
    /// Active members with both a response and a confirmation
    pub ready: usize,
    /// Active members
    pub total: usize,
    /// `ready / total * 100`, rounded down; 0 when there are no members
    pub percent: u8,
    pub required_percent: u8,
    pub is_complete: bool,
}

/// Computes warm-up readiness over a group's memberships.
///
/// Dropped members are ignored. A group without active members is never
/// complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarmUpProgressCalculator {
    required_percent: u8,
}

impl Default for WarmUpProgressCalculator {
    fn default() -> Self {
        Self {
            required_percent: 100,
        }
    }
}

impl WarmUpProgressCalculator {
    pub fn new(required_percent: u8) -> Self {
        Self {
            required_percent: required_percent.min(100),
        }
    }

    pub fn required_percent(&self) -> u8 {
        self.required_percent
    }

    pub fn compute<'a, I>(&self, memberships: I) -> WarmUpProgress
    where
        I: IntoIterator<Item = &'a Membership>,
    {
        let (ready, total) = memberships
            .into_iter()
            .filter(|m| m.is_active())
            .fold((0usize, 0usize), |(ready, total), m| {
                (ready + usize::from(m.readiness.is_ready()), total + 1)
            });

        let percent = if total == 0 {
            0
        } else {
            // ready <= total, so this never exceeds 100
            ((ready * 100) / total) as u8
        };

        WarmUpProgress {
            ready,
            total,
            percent,
            required_percent: self.required_percent,
            is_complete: total > 0 && percent >= self.required_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventId, GroupId, MembershipStatus, ParticipantId, ReadinessUpdate};
    use chrono::Utc;

    fn member(id: &str, response: bool, confirmed: bool) -> Membership {
        let mut m = Membership::new(
            EventId::new("ev"),
            GroupId::new("g"),
            ParticipantId::new(id),
            Utc::now(),
        );
        if response {
            m.readiness
                .apply(ReadinessUpdate::Response("ok".into()), Utc::now());
        }
        if confirmed {
            m.readiness.apply(ReadinessUpdate::Confirm, Utc::now());
        }
        m
    }

    #[test]
    fn test_zero_members_is_zero_percent() {
        let progress = WarmUpProgressCalculator::default().compute(&[]);
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.total, 0);
        assert!(!progress.is_complete);

        let lenient = WarmUpProgressCalculator::new(0).compute(&[]);
        assert!(!lenient.is_complete);
    }

    #[test]
    fn test_percent_rounds_down() {
        let members = vec![
            member("a", true, true),
            member("b", true, false),
            member("c", false, true),
        ];
        let progress = WarmUpProgressCalculator::default().compute(&members);
        assert_eq!(progress.ready, 1);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percent, 33);
        assert!(!progress.is_complete);
    }

    #[test]
    fn test_complete_when_everyone_ready() {
        let members = vec![member("a", true, true), member("b", true, true)];
        let progress = WarmUpProgressCalculator::default().compute(&members);
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete);
    }

    #[test]
    fn test_dropped_members_are_ignored() {
        let mut dropped = member("b", false, false);
        dropped.status = MembershipStatus::Dropped;
        let members = vec![member("a", true, true), dropped];
        let progress = WarmUpProgressCalculator::default().compute(&members);
        assert_eq!(progress.total, 1);
        assert!(progress.is_complete);
    }

    #[test]
    fn test_custom_threshold() {
        let members = vec![
            member("a", true, true),
            member("b", true, true),
            member("c", false, false),
            member("d", true, true),
        ];
        let calc = WarmUpProgressCalculator::new(75);
        assert!(calc.compute(&members).is_complete);
        assert!(!WarmUpProgressCalculator::new(80).compute(&members).is_complete);
    }
}
