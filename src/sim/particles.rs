//! Transient particle bursts for top-tier shots
//!
//! Purely visual. The engine is the only writer of its particle list; the
//! renderer reads it through [`ParticleEngine::current`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::ScoreTier;
use crate::consts::*;

/// Burst colors (gold, orange, white, red)
const PALETTE: [[f32; 3]; 4] = [
    [1.0, 0.84, 0.2],
    [1.0, 0.55, 0.1],
    [1.0, 1.0, 0.95],
    [0.95, 0.2, 0.2],
];

/// A single particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: [f32; 3],
    /// 1.0 at spawn, removed at or below zero
    pub alpha: f32,
    pub size: f32,
}

/// Owns the live particle set
#[derive(Debug, Clone)]
pub struct ParticleEngine {
    particles: Vec<Particle>,
    rng: Pcg32,
    /// Burst size multiplier from the quality preset (0 disables bursts)
    burst_scale: f32,
}

impl ParticleEngine {
    pub fn new(seed: u64, burst_scale: f32) -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            rng: Pcg32::seed_from_u64(seed),
            burst_scale: burst_scale.max(0.0),
        }
    }

    pub fn set_burst_scale(&mut self, scale: f32) {
        self.burst_scale = scale.max(0.0);
    }

    /// Radial burst at `origin` sized by `tier`
    pub fn spawn(&mut self, origin: Vec2, tier: ScoreTier) {
        let count = (tier.burst_count() as f32 * self.burst_scale).round() as usize;
        for i in 0..count {
            if self.particles.len() >= MAX_PARTICLES {
                // Drop the oldest to make room
                self.particles.remove(0);
            }
            let base = i as f32 / count as f32 * std::f32::consts::TAU;
            let angle = base + self.rng.random_range(-0.15..0.15);
            let speed = self.rng.random_range(PARTICLE_SPEED_MIN..PARTICLE_SPEED_MAX);
            let color = PALETTE[self.rng.random_range(0..PALETTE.len())];
            let size = self.rng.random_range(PARTICLE_SIZE_MIN..PARTICLE_SIZE_MAX);
            self.particles.push(Particle {
                pos: origin,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color,
                alpha: 1.0,
                size,
            });
        }
    }

    /// Advance every particle one step and drop the faded ones
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.clamp(MIN_TICK_DT, MAX_TICK_DT);
        for p in self.particles.iter_mut() {
            p.pos += p.vel * dt;
            p.vel.y -= PARTICLE_GRAVITY * dt;
            p.alpha -= PARTICLE_DECAY * dt;
        }
        self.particles.retain(|p| p.alpha > 0.0);
    }

    pub fn current(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

/// Upper bound on ticks a freshly spawned particle can survive
pub fn max_lifetime_ticks() -> u32 {
    (1.0 / (PARTICLE_DECAY * MIN_TICK_DT)).ceil() as u32 + 1
}
