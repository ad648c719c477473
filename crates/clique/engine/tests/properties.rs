//! Property tests: exclusivity under random membership traffic and the
//! reciprocal-edge rule of the resolver.

mod common;

use chrono::Utc;
use clique_engine::{match_edges, mutual_set};
use clique_types::{EventId, GroupId, MatchRequest, NewMatchRequest, ParticipantId};
use common::*;
use proptest::prelude::*;
use std::collections::HashMap;

const PARTICIPANTS: usize = 6;
const GROUPS: usize = 3;

#[derive(Debug, Clone)]
enum MembershipOp {
    Assign(usize, usize),
    Unassign(usize, usize),
    Drop(usize, usize),
    Swap(usize, usize),
    Lock(usize),
    Unlock(usize),
}

fn op_strategy() -> impl Strategy<Value = Vec<MembershipOp>> {
    let group = 0..GROUPS;
    let person = 0..PARTICIPANTS;
    proptest::collection::vec(
        prop_oneof![
            4 => (group.clone(), person.clone()).prop_map(|(g, p)| MembershipOp::Assign(g, p)),
            1 => (group.clone(), person.clone()).prop_map(|(g, p)| MembershipOp::Unassign(g, p)),
            1 => (group.clone(), person.clone()).prop_map(|(g, p)| MembershipOp::Drop(g, p)),
            2 => (person.clone(), person.clone()).prop_map(|(a, b)| MembershipOp::Swap(a, b)),
            1 => group.clone().prop_map(MembershipOp::Lock),
            1 => group.prop_map(MembershipOp::Unlock),
        ],
        0..40,
    )
}

fn participant(idx: usize) -> ParticipantId {
    p(&format!("p{}", idx))
}

proptest! {
    #[test]
    fn property_one_active_seat_per_participant(ops in op_strategy()) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        rt.block_on(async move {
            let engine = engine();
            let event = seed_event(&engine, "prop", "Prop Night", &[]).await;
            let mut groups: Vec<GroupId> = Vec::new();
            for _ in 0..GROUPS {
                let group = engine
                    .formation()
                    .create_group(&event, Some(3), &admin())
                    .await
                    .unwrap();
                groups.push(group.id);
            }

            for op in ops {
                // Rejections are expected; only the invariants matter here
                let _ = match op {
                    MembershipOp::Assign(g, i) => engine
                        .ledger()
                        .assign(&groups[g], &participant(i), &admin())
                        .await
                        .map(|_| ()),
                    MembershipOp::Unassign(g, i) => engine
                        .ledger()
                        .unassign(&groups[g], &participant(i), &admin())
                        .await
                        .map(|_| ()),
                    MembershipOp::Drop(g, i) => engine
                        .ledger()
                        .mark_dropped(&groups[g], &participant(i), &admin())
                        .await
                        .map(|_| ()),
                    MembershipOp::Swap(a, b) => engine
                        .ledger()
                        .swap(&event, &participant(a), &participant(b), &admin())
                        .await
                        .map(|_| ()),
                    MembershipOp::Lock(g) => engine
                        .formation()
                        .lock(&groups[g], &admin())
                        .await
                        .map(|_| ()),
                    MembershipOp::Unlock(g) => engine
                        .formation()
                        .unlock(&groups[g], &admin())
                        .await
                        .map(|_| ()),
                };

                let mut seats: HashMap<ParticipantId, usize> = HashMap::new();
                for group_id in &groups {
                    let members = engine.ledger().members_of(group_id).await.unwrap();
                    assert!(members.len() <= 3, "group over capacity");
                    for member in members {
                        *seats.entry(member.participant_id).or_default() += 1;
                    }
                }
                assert!(
                    seats.values().all(|count| *count == 1),
                    "participant seated twice: {:?}",
                    seats
                );
            }
        });
    }
}

fn selections_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    proptest::collection::vec(proptest::collection::vec(0..5usize, 0..5), 0..6)
}

fn requests_from(selections: &[Vec<usize>]) -> Vec<MatchRequest> {
    selections
        .iter()
        .enumerate()
        .map(|(idx, picks)| {
            NewMatchRequest::new(
                EventId::new("ev"),
                GroupId::new("g"),
                participant(idx),
                picks.iter().map(|pick| participant(*pick)),
            )
            .normalized()
            .into_request(idx as u64 + 1, Utc::now())
        })
        .collect()
}

proptest! {
    #[test]
    fn property_members_have_a_reciprocal_partner(selections in selections_strategy()) {
        let requests = requests_from(&selections);
        let members = mutual_set(&requests);
        let by_requester: HashMap<&ParticipantId, &MatchRequest> =
            requests.iter().map(|r| (&r.requester, r)).collect();

        for request in &requests {
            let reciprocated = request.selections.iter().any(|peer| {
                by_requester
                    .get(peer)
                    .map(|other| other.selects(&request.requester))
                    .unwrap_or(false)
            });
            prop_assert_eq!(members.contains(&request.requester), reciprocated);
        }

        for (a, b) in match_edges(&requests) {
            prop_assert!(by_requester[&a].selects(&b));
            prop_assert!(by_requester[&b].selects(&a));
        }

        // Leader is the earliest submitter among members
        if let Some(first) = members.first() {
            let seq = by_requester[first].submission_seq;
            prop_assert!(members.iter().all(|m| by_requester[m].submission_seq >= seq));
        }
    }
}
