//! Timed status effects: apply, tick, expire.
//!
//! Effects live on any [`Character`]. Multiple instances of the same kind
//! may coexist and are never merged.

use crate::world::Character;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outgoing attack multiplier per active Bless stack.
pub const BLESS_MULTIPLIER: f64 = 1.10;

/// Closed set of status effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Loses 5% of max hp per tick.
    Poison,
    /// Loses 3% of max hp per tick.
    Burn,
    /// Skips the bearer's next action. Each stack is spent by the turn it
    /// blocks, not by round ticks.
    Freeze,
    /// Multiplies outgoing attack by [`BLESS_MULTIPLIER`] per stack.
    Bless,
}

impl StatusKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatusKind::Poison => "Poison",
            StatusKind::Burn => "Burn",
            StatusKind::Freeze => "Freeze",
            StatusKind::Bless => "Bless",
        }
    }

    /// Percent of max hp lost per tick, for damage-over-time kinds.
    pub fn damage_percent(&self) -> Option<i32> {
        match self {
            StatusKind::Poison => Some(5),
            StatusKind::Burn => Some(3),
            StatusKind::Freeze | StatusKind::Bless => None,
        }
    }

    pub fn is_damage_over_time(&self) -> bool {
        self.damage_percent().is_some()
    }

    /// Whether end-of-round ticks count this kind down.
    pub fn ticks_each_round(&self) -> bool {
        !matches!(self, StatusKind::Freeze)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One active effect instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub duration: u32,
    pub remaining_turns: u32,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, duration: u32) -> Self {
        Self {
            kind,
            duration,
            remaining_turns: duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_turns == 0
    }
}

/// What happened to one effect during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTick {
    Damage { kind: StatusKind, amount: i32 },
    Expired { kind: StatusKind },
}

/// Append a new effect to `target`.
pub fn apply(target: &mut Character, kind: StatusKind, duration: u32) {
    target.status_effects.push(StatusEffect::new(kind, duration));
}

/// Advance every effect on `target` by one turn.
///
/// Each effect loses one remaining turn; damage-over-time effects then deal
/// their share of max hp (floored); effects at zero are removed. Freeze is
/// left alone, see [`spend_freeze`]. Results are reported in the order the
/// effects were applied.
pub fn tick(target: &mut Character) -> Vec<StatusTick> {
    let mut results = Vec::new();
    let max_hp = target.hp.maximum;

    for effect in target
        .status_effects
        .iter_mut()
        .filter(|e| e.kind.ticks_each_round())
    {
        effect.remaining_turns = effect.remaining_turns.saturating_sub(1);
        if let Some(percent) = effect.kind.damage_percent() {
            let amount = max_hp * percent / 100;
            target.hp.take(amount);
            results.push(StatusTick::Damage {
                kind: effect.kind,
                amount,
            });
        }
        if effect.is_expired() {
            results.push(StatusTick::Expired { kind: effect.kind });
        }
    }

    target.status_effects.retain(|e| !e.is_expired());
    results
}

/// Remove every effect. Returns how many were cleared.
pub fn cleanse(target: &mut Character) -> usize {
    let count = target.status_effects.len();
    target.status_effects.clear();
    count
}

pub fn is_frozen(target: &Character) -> bool {
    target.has_status(StatusKind::Freeze)
}

/// Spend one turn of the oldest Freeze stack on a blocked action.
///
/// Returns `Some(StatusTick::Expired)` when that stack is used up, `None`
/// when it still has turns left or the target was not frozen.
pub fn spend_freeze(target: &mut Character) -> Option<StatusTick> {
    let index = target
        .status_effects
        .iter()
        .position(|e| e.kind == StatusKind::Freeze)?;
    let effect = &mut target.status_effects[index];
    effect.remaining_turns = effect.remaining_turns.saturating_sub(1);
    if !effect.is_expired() {
        return None;
    }
    target.status_effects.remove(index);
    Some(StatusTick::Expired {
        kind: StatusKind::Freeze,
    })
}
