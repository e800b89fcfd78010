/// Collision & scoring engine.
///
/// Overlap is strict hitbox intersection (`Hitbox::intersects`).
/// Consumables use mark-then-compact: one `retain` pass marks and drops
/// exactly the touched items, then their effects are applied in the order
/// they were stored. The collection is never mutated mid-scan.

use rand::Rng;

use crate::domain::ai;
use crate::domain::entity::{ConsumableKind, Fruit, FruitKind, Ghost, GhostMode, Player, TilePos};
use crate::domain::rules;
use crate::sim::event::GameEvent;
use crate::sim::world::WorldState;

/// Outcome of the player touching one ghost.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GhostContact {
    None,
    /// Frightened ghost eaten; carries its id.
    Ate(usize),
    /// Player lost a life.
    Caught { lives_left: u32 },
}

// ── Pellets / power pellets ──

pub fn resolve_consumables(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let reach = world.player.body.hitbox;
    let mut touched: Vec<(ConsumableKind, TilePos)> = Vec::new();

    world.items.retain(|item| {
        if item.body.active && item.body.hitbox.intersects(&reach) {
            touched.push((item.kind, item.body.tile));
            false
        } else {
            true
        }
    });

    for (kind, at) in touched {
        world.player.score += rules::consumable_points(kind);
        world.consumed += 1;

        match kind {
            ConsumableKind::Pellet => events.push(GameEvent::PelletEaten { at }),
            ConsumableKind::PowerPellet => {
                let secs = world.config.ghosts.frightened_secs;
                for g in &mut world.ghosts {
                    ai::frighten(g, secs);
                }
                world.player.powered = true;
                events.push(GameEvent::PowerPelletEaten { at });
            }
        }

        check_fruit_trigger(world, events);
    }
}

fn check_fruit_trigger(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let idx = match rules::fruit_threshold_hit(world.consumed, &world.config.fruit.thresholds) {
        Some(i) => i,
        None => return,
    };
    if world.fruit_spawned.get(idx).copied().unwrap_or(true) {
        return;
    }
    world.fruit_spawned[idx] = true;

    let kind = if world.rng.gen_bool(0.5) { FruitKind::Orange } else { FruitKind::Apple };
    let at = rules::fruit_tile(&world.maze, world.config.fruit.spawn_row);
    world.fruit = Some(Fruit::new(at, kind, world.config.fruit.lifetime_secs));
    log::debug!("fruit {kind:?} spawned at {at:?} after {} pellets", world.consumed);
    events.push(GameEvent::FruitSpawned { kind, at });
}

// ── Bonus fruit ──

/// Count down the visible fruit; expired fruit is simply removed.
pub fn tick_fruit(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    let expired = match world.fruit.as_mut() {
        Some(f) => f.tick(dt),
        None => return,
    };
    if expired {
        world.fruit = None;
        log::debug!("fruit expired");
        events.push(GameEvent::FruitExpired);
    }
}

pub fn resolve_fruit(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let kind = match &world.fruit {
        Some(f) if f.body.active && world.player.body.overlaps(&f.body) => f.kind,
        _ => return,
    };
    world.fruit = None;

    let points = rules::fruit_points(kind);
    world.player.score += points;
    world.fruit_history.push_back(kind);
    while world.fruit_history.len() > world.config.fruit.history_len {
        world.fruit_history.pop_front();
    }
    events.push(GameEvent::FruitEaten { kind, points });
}

// ── Ghosts ──

/// Player vs one ghost. Caged or eaten ghosts never touch the player.
/// Resetting the actors after a catch is the caller's job.
pub fn ghost_contact(player: &mut Player, ghost: &mut Ghost) -> GhostContact {
    if !ghost.can_touch_player() || !player.body.overlaps(&ghost.body) {
        return GhostContact::None;
    }
    if ghost.mode == GhostMode::Frightened {
        ghost.eaten = true;
        ghost.body.active = false;
        player.score += rules::GHOST_POINTS;
        GhostContact::Ate(ghost.id)
    } else {
        GhostContact::Caught { lives_left: player.lose_life() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::Consumable;
    use crate::domain::maze::Maze;

    /// Loaded world with the player at (1,1).
    fn world(rows: &[&str]) -> WorldState {
        let mut w = WorldState::new(GameConfig { seed: Some(3), ..GameConfig::default() });
        w.maze = Maze::from_rows(rows);
        w.player = Player::new(TilePos::new(1, 1), 3);
        w.fruit_spawned = vec![false; w.config.fruit.thresholds.len()];
        w.loaded = true;
        w
    }

    fn pellet(x: i32, y: i32) -> Consumable {
        Consumable::new(TilePos::new(x, y), ConsumableKind::Pellet)
    }

    #[test]
    fn pellet_scores_ten_and_counts() {
        let mut w = world(&["#####", "#   #", "#####"]);
        w.items = vec![pellet(1, 1), pellet(3, 1)];
        let mut ev = vec![];
        resolve_consumables(&mut w, &mut ev);
        assert_eq!(w.player.score, 10);
        assert_eq!(w.consumed, 1);
        assert_eq!(w.items.len(), 1);
        assert_eq!(w.items[0].body.tile, TilePos::new(3, 1));
        assert_eq!(ev, vec![GameEvent::PelletEaten { at: TilePos::new(1, 1) }]);
    }

    #[test]
    fn adjacent_pellet_is_not_touched() {
        let mut w = world(&["#####", "#   #", "#####"]);
        w.items = vec![pellet(2, 1)];
        let mut ev = vec![];
        resolve_consumables(&mut w, &mut ev);
        assert_eq!(w.player.score, 0);
        assert_eq!(w.items.len(), 1);
    }

    #[test]
    fn overlapping_pair_removes_exactly_those() {
        let mut w = world(&["#####", "#   #", "#####"]);
        // Player halfway between (1,1) and (2,1) touches both.
        w.player.body.px += 8.0;
        w.player.body.recenter_hitbox();
        w.items = vec![pellet(1, 1), pellet(3, 1), pellet(2, 1)];
        let mut ev = vec![];
        resolve_consumables(&mut w, &mut ev);
        assert_eq!(w.player.score, 20);
        assert_eq!(w.consumed, 2);
        let left: Vec<_> = w.items.iter().map(|i| i.body.tile).collect();
        assert_eq!(left, vec![TilePos::new(3, 1)]);
    }

    #[test]
    fn power_pellet_frightens_every_ghost() {
        let mut w = world(&["#####", "#   #", "#####"]);
        w.items = vec![Consumable::new(TilePos::new(1, 1), ConsumableKind::PowerPellet)];

        let caged = Ghost::new(0, TilePos::new(3, 1));
        let mut chasing = Ghost::new(1, TilePos::new(3, 1));
        chasing.released = true;
        chasing.mode = GhostMode::Chase;
        let mut scared = Ghost::new(2, TilePos::new(3, 1));
        scared.released = true;
        scared.mode = GhostMode::Frightened;
        scared.frightened_timer = 0.5;
        w.ghosts = vec![caged, chasing, scared];

        let mut ev = vec![];
        resolve_consumables(&mut w, &mut ev);
        assert_eq!(w.player.score, 50);
        assert!(w.player.powered);
        for g in &w.ghosts {
            assert_eq!(g.mode, GhostMode::Frightened, "ghost {}", g.id);
            assert_eq!(g.frightened_timer, 5.0, "ghost {}", g.id);
        }
        assert!(matches!(ev[0], GameEvent::PowerPelletEaten { .. }));
    }

    #[test]
    fn fruit_spawns_once_per_threshold() {
        let mut w = world(&["#####", "#   #", "#####"]);
        w.config.fruit.thresholds = vec![2, 4];
        w.fruit_spawned = vec![false, false];

        let mut spawned = 0;
        for n in 0..6 {
            w.items = vec![pellet(1, 1)];
            let mut ev = vec![];
            resolve_consumables(&mut w, &mut ev);
            spawned += ev.iter().filter(|e| matches!(e, GameEvent::FruitSpawned { .. })).count();
            if n == 1 {
                assert!(w.fruit.is_some());
            }
        }
        assert_eq!(spawned, 2);
        assert_eq!(w.fruit_spawned, vec![true, true]);

        // Counter passing the threshold again (after a manual rewind) does nothing.
        w.consumed = 1;
        w.items = vec![pellet(1, 1)];
        let mut ev = vec![];
        resolve_consumables(&mut w, &mut ev);
        assert!(ev.iter().all(|e| !matches!(e, GameEvent::FruitSpawned { .. })));
    }

    #[test]
    fn fruit_appears_in_middle_column() {
        let mut w = world(&["#######", "#     #", "#     #", "#######"]);
        w.config.fruit.thresholds = vec![1];
        w.fruit_spawned = vec![false];
        w.items = vec![pellet(1, 1)];
        let mut ev = vec![];
        resolve_consumables(&mut w, &mut ev);
        let f = w.fruit.as_ref().unwrap();
        assert_eq!(f.body.tile, TilePos::new(3, 2));
        assert_eq!(f.remaining, 9.0);
    }

    #[test]
    fn fruit_scores_and_is_recorded() {
        let mut w = world(&["#####", "#   #", "#####"]);
        w.fruit = Some(Fruit::new(TilePos::new(1, 1), FruitKind::Apple, 9.0));
        let mut ev = vec![];
        resolve_fruit(&mut w, &mut ev);
        assert_eq!(w.player.score, 500);
        assert!(w.fruit.is_none());
        assert_eq!(w.fruit_history, [FruitKind::Apple]);
        assert_eq!(ev, vec![GameEvent::FruitEaten { kind: FruitKind::Apple, points: 500 }]);
    }

    #[test]
    fn fruit_history_keeps_most_recent() {
        let mut w = world(&["#####", "#   #", "#####"]);
        for i in 0..9 {
            let kind = if i == 8 { FruitKind::Apple } else { FruitKind::Orange };
            w.fruit = Some(Fruit::new(TilePos::new(1, 1), kind, 9.0));
            resolve_fruit(&mut w, &mut vec![]);
        }
        assert_eq!(w.fruit_history.len(), 7);
        assert_eq!(w.fruit_history.back(), Some(&FruitKind::Apple));
        assert_eq!(w.player.score, 8 * 100 + 500);
    }

    #[test]
    fn fruit_expiry_removes_it() {
        let mut w = world(&["#####", "#   #", "#####"]);
        w.fruit = Some(Fruit::new(TilePos::new(3, 1), FruitKind::Orange, 0.1));
        let mut ev = vec![];
        tick_fruit(&mut w, 0.05, &mut ev);
        assert!(w.fruit.is_some());
        tick_fruit(&mut w, 0.06, &mut ev);
        assert!(w.fruit.is_none());
        assert_eq!(ev, vec![GameEvent::FruitExpired]);
        assert_eq!(w.player.score, 0);
    }

    #[test]
    fn frightened_ghost_is_eaten_for_two_hundred() {
        let mut p = Player::new(TilePos::new(1, 1), 3);
        let mut g = Ghost::new(4, TilePos::new(1, 1));
        g.released = true;
        g.mode = GhostMode::Frightened;
        assert_eq!(ghost_contact(&mut p, &mut g), GhostContact::Ate(4));
        assert!(g.eaten);
        assert_eq!(p.score, 200);
        assert_eq!(p.lives, 3);
        // Already eaten: no second helping.
        assert_eq!(ghost_contact(&mut p, &mut g), GhostContact::None);
    }

    #[test]
    fn hostile_ghost_costs_a_life_not_score() {
        let mut p = Player::new(TilePos::new(1, 1), 2);
        p.score = 90;
        let mut g = Ghost::new(0, TilePos::new(1, 1));
        g.released = true;
        g.mode = GhostMode::Chase;
        assert_eq!(ghost_contact(&mut p, &mut g), GhostContact::Caught { lives_left: 1 });
        assert_eq!(p.score, 90);
    }

    #[test]
    fn caged_ghost_is_harmless() {
        let mut p = Player::new(TilePos::new(1, 1), 3);
        let mut g = Ghost::new(0, TilePos::new(1, 1));
        assert_eq!(ghost_contact(&mut p, &mut g), GhostContact::None);
        assert_eq!(p.lives, 3);
    }
}
