//! Property tests for the damage rules and whole-duel invariants.

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::actor::{ActionState, ActorId, CombatActor, Side};
use crate::event::CombatEvent;
use crate::rules::{BlockPolicy, DamageRules, Hit, HitOutcome};

use super::helpers::{base_config, session, FRAME};

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Left), Just(Side::Right)]
}

fn state_strategy() -> impl Strategy<Value = ActionState> {
    prop_oneof![
        Just(ActionState::Idle),
        Just(ActionState::Hurt),
        side_strategy().prop_map(ActionState::Attacking),
        side_strategy().prop_map(ActionState::Defending),
    ]
}

/// Finite, non-negative damage.
fn hit_strategy() -> impl Strategy<Value = Hit> {
    hit_with_damage(0.0_f32..60.0)
}

/// Any damage value, including NaN, infinities and negatives.
fn any_hit_strategy() -> impl Strategy<Value = Hit> {
    hit_with_damage(prop_oneof![
        4 => 0.0_f32..60.0,
        2 => -60.0_f32..0.0,
        1 => Just(f32::NAN),
        1 => Just(f32::INFINITY),
        1 => Just(f32::NEG_INFINITY),
    ])
}

fn hit_with_damage(damage: impl Strategy<Value = f32>) -> impl Strategy<Value = Hit> {
    (side_strategy(), damage, 0.0_f32..=100.0).prop_map(|(side, damage, chance)| Hit {
        source: ActorId::Player,
        side,
        base_damage: damage,
        bypass_chance: chance,
    })
}

proptest! {
    #[test]
    fn health_stays_in_bounds(
        seed in any::<u64>(),
        state in state_strategy(),
        hits in prop::collection::vec(any_hit_strategy(), 1..40),
    ) {
        let rules = DamageRules::new(BlockPolicy::Reduce { fraction: 0.5 }, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut actor = CombatActor::new(ActorId::Opponent, 100.0, Vec2::ZERO);
        actor.set_state(state);

        for hit in hits {
            let before = actor.health();
            let outcome = rules.apply_hit(&mut actor, hit, 1.0, &mut rng);
            prop_assert!(actor.health() >= 0.0);
            prop_assert!(actor.health() <= actor.max_health());
            prop_assert!(actor.health() <= before);
            prop_assert_eq!(actor.is_dead(), actor.health() <= 0.0);
            if outcome.killed() {
                prop_assert!(before > 0.0);
                prop_assert_eq!(actor.state(), ActionState::Dead);
            }
        }
    }

    #[test]
    fn dead_actor_never_changes(
        seed in any::<u64>(),
        hit in any_hit_strategy(),
    ) {
        let rules = DamageRules::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut actor = CombatActor::new(ActorId::Player, 100.0, Vec2::ZERO);
        actor.set_health(0.0);
        actor.set_state(ActionState::Dead);
        let snapshot = actor.clone();

        let outcome = rules.apply_hit(&mut actor, hit, 1.0, &mut rng);
        prop_assert!(matches!(outcome, HitOutcome::Ignored(_)));
        prop_assert_eq!(actor, snapshot);
    }

    #[test]
    fn matching_guard_never_takes_full_damage(
        seed in any::<u64>(),
        hit in hit_strategy(),
    ) {
        let rules = DamageRules::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut actor = CombatActor::new(ActorId::Player, 100.0, Vec2::ZERO);
        actor.set_state(ActionState::Defending(hit.side));

        let outcome = rules.apply_hit(&mut actor, hit, 1.0, &mut rng);
        prop_assert_eq!(outcome, HitOutcome::Blocked { damage: 0.0, killed: false });
        prop_assert_eq!(actor.health(), 100.0);
        prop_assert_eq!(actor.state(), ActionState::Defending(hit.side));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn duel_invariants_hold_under_random_input(
        seed in any::<u64>(),
        inputs in prop::collection::vec((0_u8..4, side_strategy()), 60..240),
    ) {
        let mut config = base_config();
        config.seed = seed;
        let mut duel = session(config);

        for (input, side) in inputs {
            match input {
                0 => { duel.player_attack(side); }
                1 => { duel.player_defend(side); }
                _ => {}
            }
            for _ in 0..10 {
                duel.step(FRAME);
            }

            for id in ActorId::ALL {
                let actor = duel.actor(id);
                prop_assert!(actor.health() >= 0.0 && actor.health() <= actor.max_health());
                prop_assert_eq!(actor.is_dead(), actor.state() == ActionState::Dead);
            }
            prop_assert!(!(duel.player().is_dead() && duel.opponent().is_dead()));
        }

        let events = duel.take_events();
        let deaths = events
            .iter()
            .filter(|record| matches!(record.event, CombatEvent::Died { .. }))
            .count();
        prop_assert!(deaths <= 1);
    }
}
