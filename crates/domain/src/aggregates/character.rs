//! Character record aggregate - the stored player or non-player character sheet
//!
//! # Rustic DDD Design
//!
//! This aggregate follows Rustic DDD principles:
//! - **Private fields**: All fields are encapsulated
//! - **Newtypes**: `CharacterName`, `ClassList`, `HitPoints` are valid by construction
//! - **State enum**: `LifecycleStatus` replaces `is_deleted` flags and loose tokens
//! - **Domain events**: HP mutations return outcome enums (`DamageOutcome`, etc.)
//! - **Valid by construction**: `new()` takes a validated `NewCharacter`
//!
//! The stored `proficiency_bonus` is a cache. Every constructor and mutation
//! rewrites it from the total level, so it can never drift from the classes.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculations::{damage, progression};
use crate::events::{DamageOutcome, HealOutcome, TemporaryHpOutcome};
use crate::ids::{CharacterId, PartyId, UserId};
use crate::validation::{CharacterChanges, NewCharacter, ValidationError};
use crate::value_objects::{
    AbilityScores, CharacterKind, CharacterName, ClassList, EquipmentItem, FreeText, HitPoints,
    LifecycleStatus, SaveProficiencies, Size, Skill, SpellEntry,
};

/// A character sheet owned by one user.
///
/// # Invariants
///
/// - `name` is always non-empty and <= 200 characters (enforced by `CharacterName`)
/// - `classes` is non-empty, duplicate-free, and totals 1..=20 levels (enforced by `ClassList`)
/// - `hit_points.current <= hit_points.maximum` (enforced by `HitPoints`)
/// - `proficiency_bonus` always equals the value derived from the total level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    // Identity
    id: CharacterId,
    owner_id: UserId,
    name: CharacterName,
    kind: CharacterKind,
    race: String,
    #[serde(default)]
    size: Size,

    // Progression
    classes: ClassList,
    #[serde(default)]
    experience_points: u32,

    // Core statistics
    ability_scores: AbilityScores,
    hit_points: HitPoints,
    armor_class: u8,
    speed: u32,
    proficiency_bonus: i32,

    // Proficiencies
    #[serde(default)]
    saving_throws: SaveProficiencies,
    #[serde(default)]
    skill_proficiencies: BTreeSet<Skill>,

    // Possessions
    #[serde(default)]
    equipment: Vec<EquipmentItem>,
    #[serde(default)]
    spells: Vec<SpellEntry>,

    // Free text
    #[serde(default = "FreeText::empty")]
    backstory: FreeText,
    #[serde(default = "FreeText::empty")]
    notes: FreeText,

    // Sharing
    #[serde(default)]
    is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    party_id: Option<PartyId>,

    // Bookkeeping
    #[serde(default)]
    status: LifecycleStatus,
    #[serde(default)]
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CharacterRecord {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create a new active record at revision 0 from a validated command.
    pub fn new(owner_id: UserId, new: NewCharacter, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            id: CharacterId::new(),
            owner_id,
            name: new.name,
            kind: new.kind,
            race: new.race,
            size: new.size,
            classes: new.classes,
            experience_points: new.experience_points,
            ability_scores: new.ability_scores,
            hit_points: new.hit_points,
            armor_class: new.armor_class,
            speed: new.speed,
            proficiency_bonus: 0,
            saving_throws: new.saving_throws,
            skill_proficiencies: new.skill_proficiencies,
            equipment: new.equipment,
            spells: new.spells,
            backstory: new.backstory,
            notes: new.notes,
            is_public: new.is_public,
            party_id: new.party_id,
            status: LifecycleStatus::Active,
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        record.sync_proficiency_bonus();
        record
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    #[inline]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    #[inline]
    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> CharacterKind {
        self.kind
    }

    #[inline]
    pub fn race(&self) -> &str {
        &self.race
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn classes(&self) -> &ClassList {
        &self.classes
    }

    #[inline]
    pub fn experience_points(&self) -> u32 {
        self.experience_points
    }

    #[inline]
    pub fn ability_scores(&self) -> &AbilityScores {
        &self.ability_scores
    }

    #[inline]
    pub fn hit_points(&self) -> HitPoints {
        self.hit_points
    }

    #[inline]
    pub fn armor_class(&self) -> u8 {
        self.armor_class
    }

    #[inline]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// The cached proficiency bonus. Calculations use the derived value instead.
    #[inline]
    pub fn stored_proficiency_bonus(&self) -> i32 {
        self.proficiency_bonus
    }

    #[inline]
    pub fn saving_throws(&self) -> &SaveProficiencies {
        &self.saving_throws
    }

    #[inline]
    pub fn skill_proficiencies(&self) -> &BTreeSet<Skill> {
        &self.skill_proficiencies
    }

    #[inline]
    pub fn equipment(&self) -> &[EquipmentItem] {
        &self.equipment
    }

    #[inline]
    pub fn spells(&self) -> &[SpellEntry] {
        &self.spells
    }

    #[inline]
    pub fn backstory(&self) -> &FreeText {
        &self.backstory
    }

    #[inline]
    pub fn notes(&self) -> &FreeText {
        &self.notes
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    #[inline]
    pub fn party_id(&self) -> Option<PartyId> {
        self.party_id
    }

    #[inline]
    pub fn status(&self) -> &LifecycleStatus {
        &self.status
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sum of all class levels.
    pub fn total_level(&self) -> u32 {
        progression::total_level(&self.classes)
    }

    /// Whether the record is visible to normal reads.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Merge a validated partial update into this record.
    ///
    /// Cross-field invariants are re-checked against the merged values, so
    /// an update that only lowers `hitPoints.maximum` below the stored
    /// `current` is rejected. The record is left untouched on error.
    pub fn apply_changes(
        &mut self,
        changes: &CharacterChanges,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let hit_points = match changes.hit_points {
            Some(hp) => {
                let maximum = hp.maximum.unwrap_or(self.hit_points.maximum());
                let current = hp.current.unwrap_or(self.hit_points.current());
                let temporary = hp.temporary.unwrap_or(self.hit_points.temporary());
                HitPoints::new(maximum, current, temporary).map_err(|_| {
                    ValidationError::field("hitPoints.current", "cannot exceed hitPoints.maximum")
                })?
            }
            None => self.hit_points,
        };
        self.hit_points = hit_points;

        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(kind) = changes.kind {
            self.kind = kind;
        }
        if let Some(race) = &changes.race {
            self.race = race.clone();
        }
        if let Some(size) = changes.size {
            self.size = size;
        }
        if let Some(classes) = &changes.classes {
            self.classes = classes.clone();
        }
        for (ability, score) in &changes.ability_scores {
            self.ability_scores = self.ability_scores.with(*ability, *score);
        }
        if let Some(armor_class) = changes.armor_class {
            self.armor_class = armor_class;
        }
        if let Some(speed) = changes.speed {
            self.speed = speed;
        }
        if let Some(saving_throws) = changes.saving_throws {
            self.saving_throws = saving_throws;
        }
        if let Some(skills) = &changes.skill_proficiencies {
            self.skill_proficiencies = skills.clone();
        }
        if let Some(equipment) = &changes.equipment {
            self.equipment = equipment.clone();
        }
        if let Some(spells) = &changes.spells {
            self.spells = spells.clone();
        }
        if let Some(xp) = changes.experience_points {
            self.experience_points = xp;
        }
        if let Some(backstory) = &changes.backstory {
            self.backstory = backstory.clone();
        }
        if let Some(notes) = &changes.notes {
            self.notes = notes.clone();
        }
        if let Some(is_public) = changes.is_public {
            self.is_public = is_public;
        }
        if let Some(party_id) = changes.party_id {
            self.party_id = Some(party_id);
        }

        self.touch(now);
        Ok(())
    }

    /// Apply damage. Temporary hit points absorb it first.
    pub fn take_damage(&mut self, amount: i64, now: DateTime<Utc>) -> DamageOutcome {
        let (hit_points, outcome) = damage::take_damage(self.hit_points, amount);
        if outcome.changed() {
            self.hit_points = hit_points;
            self.touch(now);
        }
        outcome
    }

    /// Heal, capped at the maximum.
    pub fn heal(&mut self, amount: i64, now: DateTime<Utc>) -> HealOutcome {
        let (hit_points, outcome) = damage::heal(self.hit_points, amount);
        if outcome.changed() {
            self.hit_points = hit_points;
            self.touch(now);
        }
        outcome
    }

    /// Grant temporary hit points. The larger pool wins; they never stack.
    pub fn add_temporary_hp(&mut self, amount: i64, now: DateTime<Utc>) -> TemporaryHpOutcome {
        let (hit_points, outcome) = damage::add_temporary_hp(self.hit_points, amount);
        if outcome.changed() {
            self.hit_points = hit_points;
            self.touch(now);
        }
        outcome
    }

    pub fn set_visibility(&mut self, is_public: bool, now: DateTime<Utc>) {
        self.is_public = is_public;
        self.touch(now);
    }

    pub fn assign_party(&mut self, party_id: Option<PartyId>, now: DateTime<Utc>) {
        self.party_id = party_id;
        self.touch(now);
    }

    pub fn set_status(&mut self, status: LifecycleStatus, now: DateTime<Utc>) {
        self.status = status;
        self.touch(now);
    }

    /// Set the revision marker. Only storage adapters should call this.
    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.sync_proficiency_bonus();
    }

    fn sync_proficiency_bonus(&mut self) {
        self.proficiency_bonus = progression::proficiency_bonus(self.total_level());
    }
}

/// Compact listing view of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub id: CharacterId,
    pub name: String,
    pub race: String,
    pub kind: CharacterKind,
    pub total_level: u32,
    pub classes: Vec<String>,
    pub hit_points: HitPoints,
    pub armor_class: u8,
    pub is_public: bool,
}

impl From<&CharacterRecord> for CharacterSummary {
    fn from(record: &CharacterRecord) -> Self {
        Self {
            id: record.id(),
            name: record.name().to_string(),
            race: record.race().to_string(),
            kind: record.kind(),
            total_level: record.total_level(),
            classes: record
                .classes()
                .iter()
                .map(|c| format!("{} {}", c.class_name, c.level))
                .collect(),
            hit_points: record.hit_points(),
            armor_class: record.armor_class(),
            is_public: record.is_public(),
        }
    }
}


#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::test_support::*;
    use super::*;
    use crate::validation::{validate_update, CharacterInput, ClassInput, HitPointsInput};

    fn fighter() -> CharacterRecord {
        record_with(vec![ClassInput::new("Fighter", 5, "d10")], [16, 12, 14, 10, 10, 8])
    }

    mod construction {
        use super::*;

        #[test]
        fn new_record_is_active_at_revision_zero() {
            let record = fighter();
            assert!(record.is_active());
            assert_eq!(record.revision(), 0);
            assert_eq!(record.created_at(), fixed_now());
            assert_eq!(record.total_level(), 5);
        }

        #[test]
        fn stored_proficiency_matches_level() {
            assert_eq!(fighter().stored_proficiency_bonus(), 3);
        }
    }

    mod updates {
        use super::*;

        #[test]
        fn class_change_rewrites_proficiency_cache() {
            let mut record = fighter();
            let changes = validate_update(&CharacterInput {
                classes: Some(vec![
                    ClassInput::new("Fighter", 10, "d10"),
                    ClassInput::new("Wizard", 3, "d6"),
                ]),
                ..Default::default()
            })
            .unwrap();

            let later = fixed_now() + Duration::minutes(5);
            record.apply_changes(&changes, later).unwrap();

            assert_eq!(record.total_level(), 13);
            assert_eq!(record.stored_proficiency_bonus(), 5);
            assert_eq!(record.updated_at(), later);
        }

        #[test]
        fn lowering_maximum_below_stored_current_is_rejected() {
            let mut record = fighter();
            let before = record.clone();
            let changes = validate_update(&CharacterInput {
                name: Some("Renamed".into()),
                hit_points: Some(HitPointsInput {
                    maximum: Some(5),
                    current: None,
                    temporary: None,
                }),
                ..Default::default()
            })
            .unwrap();

            let err = record.apply_changes(&changes, fixed_now()).unwrap_err();
            assert_eq!(err.violations()[0].field, "hitPoints.current");
            assert_eq!(record, before);
        }

        #[test]
        fn unsupplied_fields_are_preserved() {
            let mut record = fighter();
            let changes = validate_update(&CharacterInput {
                armor_class: Some(19),
                ..Default::default()
            })
            .unwrap();
            record.apply_changes(&changes, fixed_now()).unwrap();
            assert_eq!(record.armor_class(), 19);
            assert_eq!(record.name().as_str(), "Test Subject");
            assert_eq!(record.hit_points().maximum(), 20);
        }
    }

    mod hit_points {
        use super::*;

        #[test]
        fn no_effect_leaves_timestamp_alone() {
            let mut record = fighter();
            let outcome = record.take_damage(0, fixed_now() + Duration::hours(1));
            assert_eq!(outcome, DamageOutcome::NoEffect);
            assert_eq!(record.updated_at(), fixed_now());
        }

        #[test]
        fn damage_then_heal() {
            let mut record = fighter();
            record.take_damage(8, fixed_now());
            assert_eq!(record.hit_points().current(), 12);
            let outcome = record.heal(50, fixed_now());
            assert_eq!(
                outcome,
                HealOutcome::Healed {
                    amount_healed: 8,
                    new_hp: 20
                }
            );
        }
    }

    #[test]
    fn summary_lists_classes_with_levels() {
        let record = record_with(
            vec![
                ClassInput::new("Fighter", 2, "d10"),
                ClassInput::new("Rogue", 1, "d8"),
            ],
            [10; 6],
        );
        let summary = CharacterSummary::from(&record);
        assert_eq!(summary.classes, vec!["Fighter 2", "Rogue 1"]);
        assert_eq!(summary.total_level, 3);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("totalLevel").is_some());
        assert!(json.get("isPublic").is_some());
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = fighter();
        let json = serde_json::to_string(&record).unwrap();
        let back: CharacterRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
