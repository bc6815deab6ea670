//! Push Knight headless runner
//!
//! Plays one run with a simple autopilot and logs what happens. Useful for
//! balance passes and for checking that a seed replays identically.
//!
//! Usage: push-knight [seed] [seconds] [tuning.json]

use std::error::Error;

use glam::Vec2;
use push_knight::consts::SIM_DT;
use push_knight::sim::{Direction, GameEvent, GamePhase, RenderSnapshot, Upgrade};
use push_knight::{Session, Tuning};

const DEFAULT_SEED: u64 = 42;
const DEFAULT_SECONDS: f32 = 120.0;

/// Keep-away steering: back off from whatever is closest, push anything
/// that gets inside push range, and lay traps behind while retreating
struct Autopilot {
    next_trap_at: f64,
    upgrades: usize,
}

impl Autopilot {
    fn new() -> Self {
        Self {
            next_trap_at: 3.0,
            upgrades: 0,
        }
    }

    fn drive(&mut self, session: &mut Session, snap: &RenderSnapshot, now: f64) {
        let me = snap.player.position;
        let nearest = snap
            .enemies
            .iter()
            .map(|e| (e.position, e.position.distance(me)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        // Drift toward the middle when nothing is around
        let center = snap.arena.center();
        let heading = match nearest {
            Some((pos, dist)) if dist < 250.0 => (me - pos).normalize_or_zero(),
            _ if me.distance(center) > 60.0 => (center - me).normalize_or_zero(),
            _ => Vec2::ZERO,
        };
        session.set_movement_intent(Direction::Left, heading.x < -0.3);
        session.set_movement_intent(Direction::Right, heading.x > 0.3);
        session.set_movement_intent(Direction::Up, heading.y < -0.3);
        session.set_movement_intent(Direction::Down, heading.y > 0.3);

        if let Some((_, dist)) = nearest
            && dist <= snap.player.push_range
            && snap.player.push_ready >= 1.0
        {
            session.trigger_push();
        }

        if snap.wave_active && now >= self.next_trap_at {
            let behind = me - heading * 50.0;
            if session.place_trap(behind).is_some() {
                self.next_trap_at = now + 4.0;
            }
        }

        if snap.upgrade_tokens > 0 {
            let upgrade = Upgrade::ALL[self.upgrades % Upgrade::ALL.len()];
            if session.apply_upgrade(upgrade) {
                log::info!("Upgrade: {:?}", upgrade);
                self.upgrades += 1;
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse()?,
        None => DEFAULT_SEED,
    };
    let seconds: f32 = match args.next() {
        Some(s) => s.parse()?,
        None => DEFAULT_SECONDS,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };

    log::info!("Push Knight (headless) starting with seed {}", seed);
    let mut session = Session::with_tuning(seed, tuning);
    session.subscribe(|event| {
        match event {
            GameEvent::WaveStarted { wave } => log::info!("Wave {} started", wave),
            GameEvent::WaveCompleted { wave } => log::info!("Wave {} cleared", wave),
            GameEvent::PlayerDamaged { health, max_health } => {
                log::info!("Player hit ({}/{})", health, max_health)
            }
            GameEvent::PlayerDied => log::info!("Player died"),
            other => log::info!("{:?}", other),
        }
        Ok(())
    });

    let mut pilot = Autopilot::new();
    let frames = (seconds / SIM_DT).ceil() as u64;
    for frame in 1..=frames {
        let now = frame as f64 * SIM_DT as f64;
        let snap = session.snapshot();
        pilot.drive(&mut session, &snap, now);
        session.update(SIM_DT, now);
        if session.phase() == GamePhase::GameOver {
            break;
        }
    }

    let snap = session.snapshot();
    log::info!(
        "Run over: wave {}, score {}, health {}/{}, {:.1}s simulated",
        snap.wave,
        snap.score,
        snap.player.health,
        snap.player.max_health,
        session.state().clock
    );
    println!("{}", serde_json::to_string_pretty(&snap)?);
    Ok(())
}
