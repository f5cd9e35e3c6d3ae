//! Property checks for the pairwise strategy over seeded random worlds.

use plaza_protocol::{Facing, PlayerId, Position};
use plaza_proximity::{ProximityEngine, Relationship};
use plaza_registry::PlayerRegistry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_world(rng: &mut StdRng, players: u64) -> PlayerRegistry {
    let mut reg = PlayerRegistry::default();
    for id in 1..=players {
        reg.register(PlayerId(id), format!("p{id}"), "").unwrap();
        // Odd fractions on purpose: distances land close to the threshold.
        let pos = Position::new(rng.random_range(-60.0..60.0), rng.random_range(-60.0..60.0));
        reg.update_position(PlayerId(id), pos, Facing::Down).unwrap();
    }
    reg
}

#[test]
fn test_neighbors_are_symmetric_across_random_worlds() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let threshold = rng.random_range(1.0..40.0);
        let engine = ProximityEngine::pairwise(threshold);
        let reg = random_world(&mut rng, 12);

        for p in reg.iter() {
            for q in engine.neighbors(p.id, &reg) {
                assert!(
                    engine.neighbors(q, &reg).contains(&p.id),
                    "{} sees {} but not the reverse (threshold {threshold})",
                    p.id,
                    q
                );
            }
        }
    }
}

#[test]
fn test_players_on_the_same_spot_are_neighbors() {
    let engine = ProximityEngine::pairwise(0.5);
    let mut reg = PlayerRegistry::default();
    reg.register(PlayerId(1), "a", "").unwrap();
    reg.register(PlayerId(2), "b", "").unwrap();

    let rels = engine.relationships(&reg);

    assert_eq!(rels.len(), 1);
    assert!(matches!(rels.first(), Some(Relationship::Pair(_))));
}

#[test]
fn test_relationship_count_never_exceeds_pair_count() {
    let mut rng = StdRng::seed_from_u64(7);
    let engine = ProximityEngine::pairwise(1_000.0);
    let reg = random_world(&mut rng, 9);

    // Everyone is within 1000 of everyone: n * (n - 1) / 2 pairs.
    assert_eq!(engine.relationships(&reg).len(), 9 * 8 / 2);
}
