//! Ability, save and skill bonuses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::damage::{effective_hp, vitality, Vitality};
use super::progression::proficiency_bonus;
use crate::aggregates::CharacterRecord;
use crate::value_objects::{Ability, AbilityScore, Skill};

/// `floor((score - 10) / 2)`, rounding toward negative infinity.
pub fn ability_modifier(score: AbilityScore) -> i32 {
    (i32::from(score.value()) - 10).div_euclid(2)
}

/// Full stats projection for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStats {
    pub ability_modifiers: BTreeMap<Ability, i32>,
    pub saving_throws: BTreeMap<Ability, i32>,
    pub skills: BTreeMap<Skill, i32>,
    pub total_level: u32,
    /// Class name to level.
    pub class_levels: BTreeMap<String, u8>,
    pub proficiency_bonus: i32,
    pub initiative_modifier: i32,
    pub armor_class: u8,
    pub speed: u32,
    pub passive_perception: i32,
    pub effective_hit_points: u32,
    pub status: Vitality,
    pub is_alive: bool,
    pub is_unconscious: bool,
}

pub fn calculate_character_stats(record: &CharacterRecord) -> CharacterStats {
    let scores = record.ability_scores();
    let total_level = record.total_level();
    let proficiency = proficiency_bonus(total_level);
    let modifier = |ability: Ability| ability_modifier(scores.get(ability));

    let ability_modifiers = Ability::ALL
        .into_iter()
        .map(|ability| (ability, modifier(ability)))
        .collect();

    let saving_throws = Ability::ALL
        .into_iter()
        .map(|ability| {
            let bonus = if record.saving_throws().has(ability) {
                proficiency
            } else {
                0
            };
            (ability, modifier(ability) + bonus)
        })
        .collect();

    let skills: BTreeMap<Skill, i32> = Skill::ALL
        .into_iter()
        .map(|skill| {
            let bonus = if record.skill_proficiencies().contains(&skill) {
                proficiency
            } else {
                0
            };
            (skill, modifier(skill.ability()) + bonus)
        })
        .collect();

    let perception = skills
        .get(&Skill::Perception)
        .copied()
        .unwrap_or_else(|| modifier(Ability::Wisdom));

    let class_levels = record
        .classes()
        .iter()
        .map(|c| (c.class_name.to_string(), c.level))
        .collect();

    let hit_points = record.hit_points();
    let status = vitality(&hit_points);

    CharacterStats {
        ability_modifiers,
        saving_throws,
        skills,
        total_level,
        class_levels,
        proficiency_bonus: proficiency,
        initiative_modifier: modifier(Ability::Dexterity),
        armor_class: record.armor_class(),
        speed: record.speed(),
        passive_perception: 10 + perception,
        effective_hit_points: effective_hp(&hit_points),
        status,
        is_alive: status.is_alive(),
        is_unconscious: status == Vitality::Unconscious,
    }
}
