//! Hit point state machine.
//!
//! Vitality is derived purely from `current`; there is no stored state to
//! drift. `Dead` is part of the reported vocabulary but no transition here
//! produces it.

use serde::{Deserialize, Serialize};

use crate::events::{DamageOutcome, HealOutcome, TemporaryHpOutcome};
use crate::value_objects::HitPoints;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vitality {
    Alive,
    Unconscious,
    Dead,
}

impl Vitality {
    pub fn is_alive(&self) -> bool {
        matches!(self, Vitality::Alive)
    }
}

pub fn vitality(hit_points: &HitPoints) -> Vitality {
    if hit_points.current() > 0 {
        Vitality::Alive
    } else {
        Vitality::Unconscious
    }
}

/// Current plus temporary hit points.
pub fn effective_hp(hit_points: &HitPoints) -> u32 {
    hit_points.current().saturating_add(hit_points.temporary())
}

fn positive(amount: i64) -> Option<u32> {
    (amount > 0).then(|| u32::try_from(amount).unwrap_or(u32::MAX))
}

/// Temporary hit points absorb first, the remainder comes off `current`,
/// floored at zero. Non-positive amounts do nothing.
pub fn take_damage(hit_points: HitPoints, amount: i64) -> (HitPoints, DamageOutcome) {
    let Some(amount) = positive(amount) else {
        return (hit_points, DamageOutcome::NoEffect);
    };

    let absorbed = amount.min(hit_points.temporary());
    let temporary = hit_points.temporary() - absorbed;
    let remainder = amount - absorbed;

    if remainder == 0 {
        let next = HitPoints::from_parts_unchecked(hit_points.maximum(), hit_points.current(), temporary);
        return (
            next,
            DamageOutcome::Absorbed {
                absorbed,
                remaining_temporary: temporary,
            },
        );
    }

    let damage_dealt = remainder.min(hit_points.current());
    let current = hit_points.current() - damage_dealt;
    let next = HitPoints::from_parts_unchecked(hit_points.maximum(), current, temporary);

    let outcome = if current == 0 {
        DamageOutcome::KnockedOut {
            absorbed,
            damage_dealt,
        }
    } else {
        DamageOutcome::Wounded {
            absorbed,
            damage_dealt,
            remaining_hp: current,
        }
    };
    (next, outcome)
}

/// `current = min(maximum, current + amount)`. Non-positive amounts do nothing.
pub fn heal(hit_points: HitPoints, amount: i64) -> (HitPoints, HealOutcome) {
    let Some(amount) = positive(amount) else {
        return (hit_points, HealOutcome::NoEffect);
    };
    if hit_points.current() >= hit_points.maximum() {
        return (hit_points, HealOutcome::AlreadyFull);
    }

    let new_hp = hit_points
        .current()
        .saturating_add(amount)
        .min(hit_points.maximum());
    let next = HitPoints::from_parts_unchecked(hit_points.maximum(), new_hp, hit_points.temporary());
    (
        next,
        HealOutcome::Healed {
            amount_healed: new_hp - hit_points.current(),
            new_hp,
        },
    )
}

/// `temporary = max(temporary, amount)`. Non-positive amounts do nothing.
pub fn add_temporary_hp(hit_points: HitPoints, amount: i64) -> (HitPoints, TemporaryHpOutcome) {
    let Some(amount) = positive(amount) else {
        return (hit_points, TemporaryHpOutcome::NoEffect);
    };
    if amount <= hit_points.temporary() {
        return (
            hit_points,
            TemporaryHpOutcome::Kept {
                temporary: hit_points.temporary(),
            },
        );
    }

    let next = HitPoints::from_parts_unchecked(hit_points.maximum(), hit_points.current(), amount);
    (
        next,
        TemporaryHpOutcome::Granted {
            previous: hit_points.temporary(),
            temporary: amount,
        },
    )
}
