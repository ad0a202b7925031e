//! Particle Shooter headless demo
//!
//! Builds a walled arena, spawns a ring of enemies and plays a scripted pilot
//! for a few seconds of fixed steps. Pass a tuning JSON path as the first
//! argument to override the built-in constants.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::DVec2;
    use particle_shooter::consts::{ARENA_HEIGHT, ARENA_WIDTH, UPDATES_PER_SECOND};
    use particle_shooter::polar_to_cartesian;
    use particle_shooter::sim::{EntityKind, GameEvent, TickInput, World};
    use particle_shooter::tuning::Tuning;

    env_logger::init();
    log::info!("Particle Shooter (headless) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => Tuning::from_file(&path).unwrap_or_else(|e| {
            log::warn!("{}; using built-in tuning", e);
            Tuning::default()
        }),
        None => Tuning::default(),
    };

    let mut world = World::new(&tuning);
    if let Err(e) = world.enclose_arena() {
        log::error!("Failed to build arena walls: {}", e);
        return;
    }

    let center = DVec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0);
    let ring = [
        EntityKind::Rhombus,
        EntityKind::Rhombus,
        EntityKind::Square,
        EntityKind::Rhombus,
        EntityKind::Hexagon,
        EntityKind::Rhombus,
    ];
    for (i, kind) in ring.into_iter().enumerate() {
        let angle = TAU * i as f64 / ring.len() as f64;
        let position = center + polar_to_cartesian(400.0, angle);
        if let Err(e) = world.spawn(kind, position) {
            log::warn!("{}", e);
        }
    }

    let tally: Rc<RefCell<BTreeMap<&'static str, u32>>> = Rc::default();
    let sink = Rc::clone(&tally);
    world.events_mut().subscribe(move |event| {
        let name = match event {
            GameEvent::PlayerDamaged { .. } => "player damaged",
            GameEvent::PlayerHealed { .. } => "player healed",
            GameEvent::Fired { .. } => "shots fired",
            GameEvent::EnemyBasicDamage | GameEvent::EnemySpecialDamage => "enemy hits",
            GameEvent::EnemyDeath { .. } => "enemy deaths",
            GameEvent::ItemDropped { .. } => "items dropped",
            GameEvent::LaserHit { .. } => "laser hits",
            GameEvent::GameOver => "game over",
            _ => return,
        };
        *sink.borrow_mut().entry(name).or_default() += 1;
    });

    let seconds = 20;
    for tick in 0..seconds * UPDATES_PER_SECOND {
        if world.is_game_over() {
            break;
        }
        // Circle the center while sweeping the aim around the arena
        let t = tick as f64 / UPDATES_PER_SECOND as f64;
        let input = TickInput {
            movement: polar_to_cartesian(1.0, t * 1.5 + TAU / 4.0),
            cursor: center + polar_to_cartesian(600.0, t * 0.7),
            shoot: true,
            beam: (tick / 120) % 5 == 4,
        };
        world.tick(&input);
    }

    let player = world.player();
    let stats = world.collisions().last_pass();
    log::info!(
        "Finished after {} ticks: health {}, special {}, {} entities alive",
        world.tick_count(),
        player.health(),
        player.special(),
        world.entities().count()
    );
    log::info!(
        "Last pass: {} active colliders, {} pairs tested, {} colliding",
        stats.active_colliders,
        stats.pairs_tested,
        stats.pairs_colliding
    );
    for (name, count) in tally.borrow().iter() {
        log::info!("  {}: {}", name, count);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
