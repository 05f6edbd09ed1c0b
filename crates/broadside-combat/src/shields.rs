//! Directional shield quadrants.
//!
//! Four independent quadrants absorb incoming damage before it reaches
//! armor. The quadrant is selected from the impact direction in ship frame;
//! a shield-piercing fraction of the event bypasses shields entirely.
//! Recharge energy comes from the ETS shield pool, wired up by the ship
//! aggregate each tick.

use glam::DVec3;

use broadside_core::enums::ShieldQuadrant;
use broadside_core::types::DamageEvent;

/// Outcome of one shield absorption pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShieldAbsorption {
    pub quadrant: ShieldQuadrant,
    /// Damage absorbed by the quadrant.
    pub absorbed: f64,
    /// Damage that bypassed shields via piercing.
    pub bypassed: f64,
}

/// The four directional quadrants. Ship forward is +Y.
#[derive(Debug, Clone)]
pub struct ShieldQuadrantManager {
    strength: [f64; 4],
    max_strength: f64,
}

const QUADRANTS: [ShieldQuadrant; 4] = [
    ShieldQuadrant::Front,
    ShieldQuadrant::Rear,
    ShieldQuadrant::Port,
    ShieldQuadrant::Starboard,
];

fn index(quadrant: ShieldQuadrant) -> usize {
    match quadrant {
        ShieldQuadrant::Front => 0,
        ShieldQuadrant::Rear => 1,
        ShieldQuadrant::Port => 2,
        ShieldQuadrant::Starboard => 3,
    }
}

impl ShieldQuadrantManager {
    pub fn new(quadrant_strength: f64) -> Self {
        let s = quadrant_strength.max(0.0);
        Self {
            strength: [s; 4],
            max_strength: s,
        }
    }

    /// Select the quadrant facing the attacker. The impact direction is the
    /// incoming travel direction, so the attacker sits along its negation.
    pub fn quadrant_for(direction: DVec3) -> ShieldQuadrant {
        let toward_attacker = -direction;
        if toward_attacker.y.abs() >= toward_attacker.x.abs() {
            if toward_attacker.y >= 0.0 {
                ShieldQuadrant::Front
            } else {
                ShieldQuadrant::Rear
            }
        } else if toward_attacker.x >= 0.0 {
            ShieldQuadrant::Starboard
        } else {
            ShieldQuadrant::Port
        }
    }

    /// Absorb as much of `amount` as the facing quadrant can hold.
    pub fn process(&mut self, amount: f64, event: &DamageEvent) -> ShieldAbsorption {
        let amount = amount.max(0.0);
        let quadrant = Self::quadrant_for(event.impact_direction);
        let piercing = event.shield_piercing.clamp(0.0, 1.0);
        let bypassed = amount * piercing;

        let idx = index(quadrant);
        let absorbed = (amount - bypassed).min(self.strength[idx]);
        self.strength[idx] -= absorbed;

        ShieldAbsorption {
            quadrant,
            absorbed,
            bypassed,
        }
    }

    /// Restore shield points, weakest quadrant first. Returns the amount
    /// actually applied.
    pub fn recharge(&mut self, amount: f64) -> f64 {
        let mut budget = amount.max(0.0);
        let mut applied = 0.0;
        while budget > 0.0 {
            // Weakest quadrant that still has a deficit.
            let target = (0..4)
                .filter(|&i| self.strength[i] < self.max_strength)
                .min_by(|&a, &b| self.strength[a].total_cmp(&self.strength[b]));
            let Some(idx) = target else { break };
            let headroom = self.max_strength - self.strength[idx];
            let grant = budget.min(headroom);
            self.strength[idx] += grant;
            applied += grant;
            budget -= grant;
        }
        applied
    }

    pub fn quadrant_strength(&self, quadrant: ShieldQuadrant) -> f64 {
        self.strength[index(quadrant)]
    }

    pub fn total_strength(&self) -> f64 {
        self.strength.iter().sum()
    }

    /// Total missing shield points across all quadrants.
    pub fn deficit(&self) -> f64 {
        QUADRANTS
            .iter()
            .map(|&q| self.max_strength - self.quadrant_strength(q))
            .sum()
    }
}
