//! Engine-level properties of the matching pipeline.
//!
//! Covered:
//! - Fixed scenarios: two people, three-cycle, partner cross-pairing,
//!   zero-option giver, 50 people with 10 partner pairs
//! - Generated rosters (proptest): totality, no self-assignment, exclusions
//!   respected, verdict agrees with exhaustive search, Hall witness holds
//!   when recomputed from the raw exclusions

use std::collections::{BTreeSet, HashSet};
use std::ops::Range;

use giftdraw_core::matching::{solve, Assignment, Diagnosis, Outcome, Participant, ParticipantId};
use proptest::prelude::*;

fn matched(people: &[Participant]) -> Assignment {
    match solve(people).expect("valid input") {
        Outcome::Matched(a) => a,
        Outcome::Infeasible(d) => panic!("expected a draw, got {d:?}"),
    }
}

fn infeasible(people: &[Participant]) -> Diagnosis {
    match solve(people).expect("valid input") {
        Outcome::Matched(a) => panic!("expected infeasible, got {a:?}"),
        Outcome::Infeasible(d) => d,
    }
}

fn recipient<'a>(a: &'a Assignment, giver: &str) -> &'a str {
    a.recipient_of(giver).expect("giver present").as_str()
}

/// Independent check of every post-condition, without `Assignment::verify`.
fn assert_valid(people: &[Participant], a: &Assignment) {
    assert_eq!(a.len(), people.len());
    let givers: HashSet<&ParticipantId> = a.iter().map(|p| &p.giver).collect();
    let recipients: HashSet<&ParticipantId> = a.iter().map(|p| &p.recipient).collect();
    let everyone: HashSet<&ParticipantId> = people.iter().map(|p| &p.id).collect();
    assert_eq!(givers, everyone, "every participant gives once");
    assert_eq!(recipients, everyone, "every participant receives once");
    for pair in a {
        assert_ne!(pair.giver, pair.recipient);
        let giver = people.iter().find(|p| p.id == pair.giver).unwrap();
        assert!(
            !giver.excluded.contains(&pair.recipient),
            "{} drew excluded {}",
            pair.giver,
            pair.recipient
        );
    }
}

/// N(S) straight from the exclusion lists.
fn assert_hall_witness(people: &[Participant], d: &Diagnosis) {
    assert!(!d.violator_set.is_empty());
    let neighborhood: BTreeSet<&ParticipantId> = people
        .iter()
        .filter(|g| d.violator_set.contains(&g.id))
        .flat_map(|g| {
            people
                .iter()
                .filter(move |r| g.may_give_to(&r.id))
                .map(|r| &r.id)
        })
        .collect();
    assert!(
        neighborhood.len() < d.violator_set.len(),
        "|N(S)| = {} is not below |S| = {}",
        neighborhood.len(),
        d.violator_set.len()
    );
    let reported: BTreeSet<&ParticipantId> = d.reachable_recipients.iter().collect();
    assert_eq!(neighborhood, reported);
}

// ---- Fixed scenarios ----

#[test]
fn two_people_draw_each_other() {
    let people = vec![Participant::new("a"), Participant::new("b")];
    let a = matched(&people);
    assert_eq!(recipient(&a, "a"), "b");
    assert_eq!(recipient(&a, "b"), "a");
}

#[test]
fn three_people_form_a_derangement() {
    let people = vec![
        Participant::new("a"),
        Participant::new("b"),
        Participant::new("c"),
    ];
    let a = matched(&people);
    assert_valid(&people, &a);
}

#[test]
fn partners_are_cross_paired() {
    let people = vec![
        Participant::new("a").excluding("b"),
        Participant::new("b").excluding("a"),
        Participant::new("c").excluding("d"),
        Participant::new("d").excluding("c"),
    ];
    let a = matched(&people);
    assert_valid(&people, &a);
    for giver in ["a", "b"] {
        assert!(["c", "d"].contains(&recipient(&a, giver)));
    }
    for giver in ["c", "d"] {
        assert!(["a", "b"].contains(&recipient(&a, giver)));
    }
}

#[test]
fn giver_excluding_everyone_else_is_infeasible() {
    let people = vec![
        Participant::new("a").excluding("b").excluding("c"),
        Participant::new("b"),
        Participant::new("c"),
    ];
    let d = infeasible(&people);
    assert!(d.violator_set.contains(&ParticipantId::from("a")));
    assert_eq!(d.per_giver_options[&ParticipantId::from("a")], vec![]);
    assert_eq!(d.zero_option_givers, vec![ParticipantId::from("a")]);
    assert_hall_witness(&people, &d);
}

#[test]
fn fifty_people_with_ten_partner_pairs() {
    let people: Vec<Participant> = (0..50u64)
        .map(|i| {
            if i < 20 {
                Participant::new(i).excluding(i ^ 1)
            } else {
                Participant::new(i)
            }
        })
        .collect();
    let a = matched(&people);
    assert_valid(&people, &a);
}

#[test]
fn infeasibility_is_stable_across_runs() {
    let people = vec![
        Participant::new("a").with_exclusions(["b", "c"]),
        Participant::new("b").with_exclusions(["a", "c"]),
        Participant::new("c").with_exclusions(["a", "b"]),
        Participant::new("d"),
        Participant::new("e"),
    ];
    let first = infeasible(&people);
    let second = infeasible(&people);
    assert_eq!(first, second);
    assert_hall_witness(&people, &first);
}

// ---- Generated rosters ----

/// Rosters of `sizes` people where each ordered pair is excluded with
/// probability drawn from `exclusion`.
fn roster(
    sizes: Range<u64>,
    exclusion: Range<f64>,
) -> impl Strategy<Value = Vec<Participant>> {
    (sizes, exclusion).prop_flat_map(|(n, p)| {
        let cells = (n * n) as usize;
        prop::collection::vec(prop::bool::weighted(p), cells).prop_map(move |excluded| {
            (0..n)
                .map(|g| {
                    Participant::new(g).with_exclusions(
                        (0..n)
                            .filter(|&r| r != g && excluded[(g * n + r) as usize])
                            .collect::<Vec<_>>(),
                    )
                })
                .collect()
        })
    })
}

/// Exhaustive search for any valid draw.
fn brute_force_feasible(people: &[Participant]) -> bool {
    fn place(people: &[Participant], giver: usize, taken: &mut Vec<bool>) -> bool {
        if giver == people.len() {
            return true;
        }
        for r in 0..people.len() {
            if !taken[r] && people[giver].may_give_to(&people[r].id) {
                taken[r] = true;
                if place(people, giver + 1, taken) {
                    return true;
                }
                taken[r] = false;
            }
        }
        false
    }
    place(people, 0, &mut vec![false; people.len()])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(400))]

    #[test]
    fn small_rosters_agree_with_exhaustive_search(people in roster(2..9, 0.05..0.9)) {
        match solve(&people).unwrap() {
            Outcome::Matched(a) => {
                prop_assert!(brute_force_feasible(&people));
                assert_valid(&people, &a);
            }
            Outcome::Infeasible(d) => {
                prop_assert!(!brute_force_feasible(&people), "engine missed a valid draw");
                assert_hall_witness(&people, &d);
                prop_assert_eq!(solve(&people).unwrap(), Outcome::Infeasible(d));
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn larger_rosters_hold_invariants(people in roster(40..120, 0.2..0.4)) {
        match solve(&people).unwrap() {
            Outcome::Matched(a) => assert_valid(&people, &a),
            Outcome::Infeasible(d) => assert_hall_witness(&people, &d),
        }
    }
}
