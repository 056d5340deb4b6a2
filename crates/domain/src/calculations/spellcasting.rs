//! Spellcasting resources: caster level, slots, attack bonus and save DC.

use serde::{Deserialize, Serialize};

use super::progression::proficiency_bonus;
use super::stats::ability_modifier;
use crate::aggregates::CharacterRecord;
use crate::game_systems::{CasterType, ClassCatalog, SpellSlots};
use crate::value_objects::{Ability, ClassList};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellcastingStats {
    pub caster_level: u32,
    pub spell_slots: SpellSlots,
    /// Ability used for the attack bonus and save DC, if any class casts.
    pub spellcasting_ability: Option<Ability>,
    pub spell_attack_bonus: Option<i32>,
    #[serde(rename = "spellSaveDC")]
    pub spell_save_dc: Option<i32>,
}

/// Multiclass caster level: full casters count every level, half casters
/// half, third casters a third (all rounded down per class). Pact magic
/// and non-casters add nothing.
pub fn caster_level(classes: &ClassList, catalog: &dyn ClassCatalog) -> u32 {
    classes
        .iter()
        .filter_map(|class| {
            catalog
                .caster_type(class)
                .map(|caster| u32::from(caster.effective_caster_levels(class.level)))
        })
        .sum()
}

/// Ability of the highest-level casting class; ties go to the earliest entry.
fn governing_ability(classes: &ClassList, catalog: &dyn ClassCatalog) -> Option<Ability> {
    let mut best: Option<(u8, Ability)> = None;
    for class in classes.iter() {
        if catalog.caster_type(class).is_none() {
            continue;
        }
        let Some(ability) = catalog.spellcasting_ability(class) else {
            continue;
        };
        if best.is_some_and(|(level, _)| class.level <= level) {
            continue;
        }
        best = Some((class.level, ability));
    }
    best.map(|(_, ability)| ability)
}

fn spell_slots(classes: &ClassList, catalog: &dyn ClassCatalog, caster_level: u32) -> SpellSlots {
    let table_level = u8::try_from(caster_level).unwrap_or(u8::MAX);
    let mut slots = catalog.multiclass_slots(table_level);

    let pact = classes
        .iter()
        .filter(|class| catalog.caster_type(class) == Some(CasterType::Pact))
        .filter_map(|class| catalog.pact_slots(class.level));
    for pact_slots in pact {
        *slots.entry(pact_slots.slot_level).or_insert(0) += pact_slots.count;
    }
    slots
}

pub fn calculate_spellcasting(record: &CharacterRecord, catalog: &dyn ClassCatalog) -> SpellcastingStats {
    let classes = record.classes();
    let caster_level = caster_level(classes, catalog);
    let spellcasting_ability = governing_ability(classes, catalog);
    let proficiency = proficiency_bonus(record.total_level());

    let attack_bonus = spellcasting_ability
        .map(|ability| ability_modifier(record.ability_scores().get(ability)) + proficiency);

    SpellcastingStats {
        caster_level,
        spell_slots: spell_slots(classes, catalog, caster_level),
        spellcasting_ability,
        spell_attack_bonus: attack_bonus,
        spell_save_dc: attack_bonus.map(|bonus| 8 + bonus),
    }
}
