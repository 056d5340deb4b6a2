use std::collections::BTreeSet;
use std::str::FromStr;

use super::input::{
    AbilityScoresInput, CharacterInput, ClassInput, EquipmentInput, HitPointsInput, SpellInput,
};
use super::{FieldViolation, ValidationError};
use crate::error::DomainError;
use crate::ids::PartyId;
use crate::value_objects::{
    first_duplicate, sum_levels, Ability, AbilityScore, AbilityScores, CharacterKind,
    CharacterName, ClassLevel, ClassList, ClassName, EquipmentItem, FreeText, HitDie, HitPoints,
    SaveProficiencies, Size, Skill, SpellEntry, MAX_ABILITY_SCORE, MAX_CHARACTER_LEVEL,
    MAX_CLASS_NAME_LENGTH, MAX_SPELL_LEVEL, MIN_ABILITY_SCORE,
};

const MIN_ARMOR_CLASS: i64 = 1;
const MAX_ARMOR_CLASS: i64 = 30;
const DEFAULT_SPEED: u32 = 30;
const MAX_SPEED: i64 = 1000;
const MAX_HIT_POINTS: i64 = 100_000;
const MAX_EXPERIENCE: i64 = 10_000_000;
const MAX_QUANTITY: i64 = 1_000_000;
const MAX_RACE_LENGTH: usize = 100;

// =============================================================================
// Validated output
// =============================================================================

/// A fully validated creation command.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCharacter {
    pub name: CharacterName,
    pub kind: CharacterKind,
    pub race: String,
    pub size: Size,
    pub classes: ClassList,
    pub ability_scores: AbilityScores,
    pub hit_points: HitPoints,
    pub armor_class: u8,
    pub speed: u32,
    pub saving_throws: SaveProficiencies,
    pub skill_proficiencies: BTreeSet<Skill>,
    pub equipment: Vec<EquipmentItem>,
    pub spells: Vec<SpellEntry>,
    pub experience_points: u32,
    pub backstory: FreeText,
    pub notes: FreeText,
    pub is_public: bool,
    pub party_id: Option<PartyId>,
}

/// A validated partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterChanges {
    pub name: Option<CharacterName>,
    pub kind: Option<CharacterKind>,
    pub race: Option<String>,
    pub size: Option<Size>,
    pub classes: Option<ClassList>,
    pub ability_scores: Vec<(Ability, AbilityScore)>,
    pub hit_points: Option<HitPointsChanges>,
    pub armor_class: Option<u8>,
    pub speed: Option<u32>,
    pub saving_throws: Option<SaveProficiencies>,
    pub skill_proficiencies: Option<BTreeSet<Skill>>,
    pub equipment: Option<Vec<EquipmentItem>>,
    pub spells: Option<Vec<SpellEntry>>,
    pub experience_points: Option<u32>,
    pub backstory: Option<FreeText>,
    pub notes: Option<FreeText>,
    pub is_public: Option<bool>,
    pub party_id: Option<PartyId>,
}

impl CharacterChanges {
    /// True when the update would not touch any field.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial hit point change. Cross-field checks against the stored pool
/// happen when the changes are merged into a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitPointsChanges {
    pub maximum: Option<u32>,
    pub current: Option<u32>,
    pub temporary: Option<u32>,
}

// =============================================================================
// Entry points
// =============================================================================

/// Validate a creation command.
///
/// # Errors
///
/// - `InvalidData` with every schema violation found
/// - `DuplicateClass` if two class entries share a name (schema must pass first)
/// - `InvalidLevel` if class levels add up to more than 20 (schema must pass first)
pub fn validate_create(input: &CharacterInput) -> Result<NewCharacter, ValidationError> {
    let mut v = Violations::default();

    let name = required(&mut v, "name", input.name.as_deref()).and_then(|raw| check_name(&mut v, raw));
    let kind = required(&mut v, "kind", input.kind.as_deref())
        .and_then(|raw| parse_with::<CharacterKind>(&mut v, "kind", raw));
    let race = required(&mut v, "race", input.race.as_deref()).and_then(|raw| check_race(&mut v, raw));
    let size = match input.size.as_deref() {
        Some(raw) => parse_with::<Size>(&mut v, "size", raw),
        None => Some(Size::default()),
    };
    let classes = required(&mut v, "classes", input.classes.as_deref())
        .and_then(|entries| check_classes(&mut v, entries));
    let ability_scores = required(&mut v, "abilityScores", input.ability_scores.as_ref())
        .and_then(|scores| check_all_ability_scores(&mut v, scores));
    let hit_points = required(&mut v, "hitPoints", input.hit_points.as_ref())
        .and_then(|hp| check_new_hit_points(&mut v, hp));
    let armor_class = required(&mut v, "armorClass", input.armor_class)
        .and_then(|ac| bounded::<u8>(&mut v, "armorClass", ac, MIN_ARMOR_CLASS, MAX_ARMOR_CLASS));
    let speed = match input.speed {
        Some(speed) => bounded::<u32>(&mut v, "speed", speed, 0, MAX_SPEED),
        None => Some(DEFAULT_SPEED),
    };
    let saving_throws = match input.saving_throw_proficiencies.as_deref() {
        Some(raw) => check_saving_throws(&mut v, raw),
        None => Some(SaveProficiencies::default()),
    };
    let skills = match input.skill_proficiencies.as_deref() {
        Some(raw) => check_skills(&mut v, raw),
        None => Some(BTreeSet::new()),
    };
    let equipment = match input.equipment.as_deref() {
        Some(items) => check_equipment(&mut v, items),
        None => Some(Vec::new()),
    };
    let spells = match input.spells.as_deref() {
        Some(spells) => check_spells(&mut v, spells),
        None => Some(Vec::new()),
    };
    let experience_points = match input.experience_points {
        Some(xp) => bounded::<u32>(&mut v, "experiencePoints", xp, 0, MAX_EXPERIENCE),
        None => Some(0),
    };
    let backstory = check_free_text(&mut v, "backstory", input.backstory.as_deref());
    let notes = check_free_text(&mut v, "notes", input.notes.as_deref());

    v.into_result()?;

    Ok(NewCharacter {
        name: present(name, "name")?,
        kind: present(kind, "kind")?,
        race: present(race, "race")?,
        size: present(size, "size")?,
        classes: check_class_rules(present(classes, "classes")?)?,
        ability_scores: present(ability_scores, "abilityScores")?,
        hit_points: present(hit_points, "hitPoints")?,
        armor_class: present(armor_class, "armorClass")?,
        speed: present(speed, "speed")?,
        saving_throws: present(saving_throws, "savingThrowProficiencies")?,
        skill_proficiencies: present(skills, "skillProficiencies")?,
        equipment: present(equipment, "equipment")?,
        spells: present(spells, "spells")?,
        experience_points: present(experience_points, "experiencePoints")?,
        backstory: present(backstory, "backstory")?,
        notes: present(notes, "notes")?,
        is_public: input.is_public.unwrap_or(false),
        party_id: input.party_id.map(PartyId::from_uuid),
    })
}

/// Validate an update command. Only supplied fields are checked.
///
/// Ownership is not checked here; that belongs to the access policy.
pub fn validate_update(input: &CharacterInput) -> Result<CharacterChanges, ValidationError> {
    let mut v = Violations::default();

    let name = input.name.as_deref().map(|raw| check_name(&mut v, raw));
    let kind = input
        .kind
        .as_deref()
        .map(|raw| parse_with::<CharacterKind>(&mut v, "kind", raw));
    let race = input.race.as_deref().map(|raw| check_race(&mut v, raw));
    let size = input
        .size
        .as_deref()
        .map(|raw| parse_with::<Size>(&mut v, "size", raw));
    let classes = input
        .classes
        .as_deref()
        .map(|entries| check_classes(&mut v, entries));
    let ability_scores = input
        .ability_scores
        .as_ref()
        .map(|scores| check_supplied_ability_scores(&mut v, scores))
        .unwrap_or_default();
    let hit_points = input
        .hit_points
        .as_ref()
        .map(|hp| check_hit_point_changes(&mut v, hp));
    let armor_class = input
        .armor_class
        .map(|ac| bounded::<u8>(&mut v, "armorClass", ac, MIN_ARMOR_CLASS, MAX_ARMOR_CLASS));
    let speed = input
        .speed
        .map(|speed| bounded::<u32>(&mut v, "speed", speed, 0, MAX_SPEED));
    let saving_throws = input
        .saving_throw_proficiencies
        .as_deref()
        .map(|raw| check_saving_throws(&mut v, raw));
    let skills = input
        .skill_proficiencies
        .as_deref()
        .map(|raw| check_skills(&mut v, raw));
    let equipment = input
        .equipment
        .as_deref()
        .map(|items| check_equipment(&mut v, items));
    let spells = input.spells.as_deref().map(|spells| check_spells(&mut v, spells));
    let experience_points = input
        .experience_points
        .map(|xp| bounded::<u32>(&mut v, "experiencePoints", xp, 0, MAX_EXPERIENCE));
    let backstory = input
        .backstory
        .as_deref()
        .map(|text| check_free_text(&mut v, "backstory", Some(text)));
    let notes = input
        .notes
        .as_deref()
        .map(|text| check_free_text(&mut v, "notes", Some(text)));

    v.into_result()?;

    // Every supplied-but-invalid field pushed a violation above, so a `Some(None)`
    // cannot survive to this point; `flatten` only drops absent fields.
    let classes = match classes.flatten() {
        Some(entries) => Some(check_class_rules(entries)?),
        None => None,
    };

    Ok(CharacterChanges {
        name: name.flatten(),
        kind: kind.flatten(),
        race: race.flatten(),
        size: size.flatten(),
        classes,
        ability_scores,
        hit_points: hit_points.flatten(),
        armor_class: armor_class.flatten(),
        speed: speed.flatten(),
        saving_throws: saving_throws.flatten(),
        skill_proficiencies: skills.flatten(),
        equipment: equipment.flatten(),
        spells: spells.flatten(),
        experience_points: experience_points.flatten(),
        backstory: backstory.flatten(),
        notes: notes.flatten(),
        is_public: input.is_public,
        party_id: input.party_id.map(PartyId::from_uuid),
    })
}

// =============================================================================
// Business rules
// =============================================================================

fn check_class_rules(entries: Vec<ClassLevel>) -> Result<ClassList, ValidationError> {
    if let Some(duplicate) = first_duplicate(&entries) {
        return Err(ValidationError::DuplicateClass {
            class_name: duplicate.to_string(),
        });
    }
    let total = sum_levels(&entries);
    if total > MAX_CHARACTER_LEVEL {
        return Err(ValidationError::InvalidLevel { total });
    }
    ClassList::new(entries).map_err(|e| ValidationError::field("classes", e.detail()))
}

// =============================================================================
// Schema checks
// =============================================================================

#[derive(Default)]
struct Violations(Vec<FieldViolation>);

impl Violations {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    fn into_result(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::InvalidData(self.0))
        }
    }
}

fn required<T>(v: &mut Violations, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        v.push(field, "is required");
    }
    value
}

fn present<T>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::field(field, "is required"))
}

/// Range-check an integer and narrow it to `T`.
fn bounded<T: TryFrom<i64>>(v: &mut Violations, field: &str, value: i64, min: i64, max: i64) -> Option<T> {
    if value < min || value > max {
        v.push(
            field,
            format!("must be between {} and {}, got {}", min, max, value),
        );
        return None;
    }
    let narrowed = T::try_from(value).ok();
    if narrowed.is_none() {
        v.push(field, format!("{} is out of range", value));
    }
    narrowed
}

fn parse_with<T>(v: &mut Violations, field: &str, raw: &str) -> Option<T>
where
    T: FromStr<Err = DomainError>,
{
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            v.push(field, e.detail());
            None
        }
    }
}

fn check_name(v: &mut Violations, raw: &str) -> Option<CharacterName> {
    CharacterName::new(raw)
        .map_err(|e| v.push("name", e.detail()))
        .ok()
}

fn check_race(v: &mut Violations, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        v.push("race", "cannot be empty");
        return None;
    }
    if trimmed.chars().count() > MAX_RACE_LENGTH {
        v.push("race", format!("cannot exceed {} characters", MAX_RACE_LENGTH));
        return None;
    }
    Some(trimmed.to_string())
}

fn check_free_text(v: &mut Violations, field: &str, raw: Option<&str>) -> Option<FreeText> {
    match raw {
        None => Some(FreeText::empty()),
        Some(text) => FreeText::new(text).map_err(|e| v.push(field, e.detail())).ok(),
    }
}

fn check_classes(v: &mut Violations, entries: &[ClassInput]) -> Option<Vec<ClassLevel>> {
    if entries.is_empty() {
        v.push("classes", "at least one class is required");
        return None;
    }
    let checked: Vec<Option<ClassLevel>> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| check_class(v, &format!("classes[{}]", i), entry))
        .collect();
    checked.into_iter().collect()
}

fn check_class(v: &mut Violations, prefix: &str, entry: &ClassInput) -> Option<ClassLevel> {
    let name_field = format!("{}.className", prefix);
    let class_name = required(v, &name_field, entry.class_name.as_deref())
        .and_then(|raw| ClassName::new(raw).map_err(|e| v.push(&name_field, e.detail())).ok());

    let level_field = format!("{}.level", prefix);
    let level = required(v, &level_field, entry.level).and_then(|level| {
        bounded::<u8>(v, &level_field, level, 1, i64::from(MAX_CHARACTER_LEVEL))
    });

    let die_field = format!("{}.hitDie", prefix);
    let hit_die = required(v, &die_field, entry.hit_die.as_deref())
        .and_then(|raw| parse_with::<HitDie>(v, &die_field, raw));

    let subclass = match entry.subclass.as_deref().map(str::trim) {
        None | Some("") => Some(None),
        Some(sub) if sub.chars().count() > MAX_CLASS_NAME_LENGTH => {
            v.push(
                format!("{}.subclass", prefix),
                format!("cannot exceed {} characters", MAX_CLASS_NAME_LENGTH),
            );
            None
        }
        Some(sub) => Some(Some(sub.to_string())),
    };

    Some(ClassLevel {
        class_name: class_name?,
        level: level?,
        subclass: subclass?,
        hit_die: hit_die?,
    })
}

fn check_ability(v: &mut Violations, ability: Ability, raw: i64) -> Option<AbilityScore> {
    let field = format!("abilityScores.{}", ability.name());
    bounded::<u8>(
        v,
        &field,
        raw,
        i64::from(MIN_ABILITY_SCORE),
        i64::from(MAX_ABILITY_SCORE),
    )
    .and_then(|score| AbilityScore::new(score).map_err(|e| v.push(&field, e.detail())).ok())
}

fn check_all_ability_scores(v: &mut Violations, input: &AbilityScoresInput) -> Option<AbilityScores> {
    let mut scores = Some(AbilityScores::default());
    for ability in Ability::ALL {
        let field = format!("abilityScores.{}", ability.name());
        let checked = required(v, &field, input.get(ability)).and_then(|raw| check_ability(v, ability, raw));
        scores = match (scores, checked) {
            (Some(acc), Some(score)) => Some(acc.with(ability, score)),
            _ => None,
        };
    }
    scores
}

fn check_supplied_ability_scores(v: &mut Violations, input: &AbilityScoresInput) -> Vec<(Ability, AbilityScore)> {
    Ability::ALL
        .into_iter()
        .filter_map(|ability| {
            input
                .get(ability)
                .and_then(|raw| check_ability(v, ability, raw))
                .map(|score| (ability, score))
        })
        .collect()
}

fn check_hit_point_value(v: &mut Violations, field: &str, raw: i64, min: i64) -> Option<u32> {
    bounded::<u32>(v, field, raw, min, MAX_HIT_POINTS)
}

fn check_new_hit_points(v: &mut Violations, input: &HitPointsInput) -> Option<HitPoints> {
    let maximum = required(v, "hitPoints.maximum", input.maximum)
        .and_then(|raw| check_hit_point_value(v, "hitPoints.maximum", raw, 1));
    let current = match input.current {
        Some(raw) => check_hit_point_value(v, "hitPoints.current", raw, 0),
        None => maximum,
    };
    let temporary = match input.temporary {
        Some(raw) => check_hit_point_value(v, "hitPoints.temporary", raw, 0),
        None => Some(0),
    };

    let (maximum, current, temporary) = (maximum?, current?, temporary?);
    HitPoints::new(maximum, current, temporary)
        .map_err(|_| v.push("hitPoints.current", "cannot exceed hitPoints.maximum"))
        .ok()
}

fn check_hit_point_changes(v: &mut Violations, input: &HitPointsInput) -> Option<HitPointsChanges> {
    let maximum = input
        .maximum
        .map(|raw| check_hit_point_value(v, "hitPoints.maximum", raw, 1));
    let current = input
        .current
        .map(|raw| check_hit_point_value(v, "hitPoints.current", raw, 0));
    let temporary = input
        .temporary
        .map(|raw| check_hit_point_value(v, "hitPoints.temporary", raw, 0));

    if let (Some(Some(max)), Some(Some(cur))) = (maximum, current) {
        if cur > max {
            v.push("hitPoints.current", "cannot exceed hitPoints.maximum");
            return None;
        }
    }

    Some(HitPointsChanges {
        maximum: maximum.flatten(),
        current: current.flatten(),
        temporary: temporary.flatten(),
    })
}

fn check_saving_throws(v: &mut Violations, raw: &[String]) -> Option<SaveProficiencies> {
    let abilities: Vec<Option<Ability>> = raw
        .iter()
        .enumerate()
        .map(|(i, name)| parse_with::<Ability>(v, &format!("savingThrowProficiencies[{}]", i), name))
        .collect();
    let abilities: Option<Vec<Ability>> = abilities.into_iter().collect();
    abilities.map(SaveProficiencies::from_abilities)
}

fn check_skills(v: &mut Violations, raw: &[String]) -> Option<BTreeSet<Skill>> {
    let skills: Vec<Option<Skill>> = raw
        .iter()
        .enumerate()
        .map(|(i, name)| parse_with::<Skill>(v, &format!("skillProficiencies[{}]", i), name))
        .collect();
    skills.into_iter().collect()
}

fn check_non_negative(v: &mut Violations, field: &str, raw: Option<f64>) -> Option<f64> {
    let value = raw.unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        v.push(field, "must be a finite, non-negative number");
        return None;
    }
    Some(value)
}

fn check_equipment(v: &mut Violations, items: &[EquipmentInput]) -> Option<Vec<EquipmentItem>> {
    let checked: Vec<Option<EquipmentItem>> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let prefix = format!("equipment[{}]", i);
            let name_field = format!("{}.name", prefix);
            let name = required(v, &name_field, item.name.as_deref()).and_then(|raw| {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    v.push(&name_field, "cannot be empty");
                    None
                } else {
                    Some(trimmed.to_string())
                }
            });
            let quantity = bounded::<u32>(
                v,
                &format!("{}.quantity", prefix),
                item.quantity.unwrap_or(1),
                0,
                MAX_QUANTITY,
            );
            let weight = check_non_negative(v, &format!("{}.weight", prefix), item.weight);
            let value = check_non_negative(v, &format!("{}.value", prefix), item.value);

            Some(EquipmentItem {
                name: name?,
                quantity: quantity?,
                weight: weight?,
                value: value?,
                equipped: item.equipped.unwrap_or(false),
                magical: item.magical.unwrap_or(false),
            })
        })
        .collect();
    checked.into_iter().collect()
}

fn check_spells(v: &mut Violations, spells: &[SpellInput]) -> Option<Vec<SpellEntry>> {
    let checked: Vec<Option<SpellEntry>> = spells
        .iter()
        .enumerate()
        .map(|(i, spell)| {
            let name_field = format!("spells[{}].name", i);
            let name = required(v, &name_field, spell.name.as_deref()).and_then(|raw| {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    v.push(&name_field, "cannot be empty");
                    None
                } else {
                    Some(trimmed.to_string())
                }
            });
            let level_field = format!("spells[{}].level", i);
            let level = required(v, &level_field, spell.level)
                .and_then(|level| bounded::<u8>(v, &level_field, level, 0, i64::from(MAX_SPELL_LEVEL)));

            Some(SpellEntry {
                name: name?,
                level: level?,
                prepared: spell.prepared.unwrap_or(false),
            })
        })
        .collect();
    checked.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter_input() -> CharacterInput {
        CharacterInput {
            name: Some("Bruenor".into()),
            kind: Some("pc".into()),
            race: Some("Dwarf".into()),
            classes: Some(vec![ClassInput::new("Fighter", 3, "d10")]),
            ability_scores: Some(AbilityScoresInput::all([16, 12, 14, 10, 13, 8])),
            hit_points: Some(HitPointsInput {
                maximum: Some(28),
                current: None,
                temporary: None,
            }),
            armor_class: Some(18),
            ..Default::default()
        }
    }

    mod create {
        use super::*;

        #[test]
        fn valid_payload_produces_typed_character() {
            let new = validate_create(&fighter_input()).unwrap();
            assert_eq!(new.name.as_str(), "Bruenor");
            assert_eq!(new.kind, CharacterKind::Pc);
            assert_eq!(new.classes.total_level(), 3);
            assert_eq!(new.hit_points.current(), 28);
            assert_eq!(new.speed, DEFAULT_SPEED);
            assert_eq!(new.size, Size::Medium);
            assert!(!new.is_public);
        }

        #[test]
        fn missing_required_fields_are_all_reported() {
            let err = validate_create(&CharacterInput::default()).unwrap_err();
            let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
            for required in ["name", "kind", "race", "classes", "abilityScores", "hitPoints", "armorClass"] {
                assert!(fields.contains(&required), "missing violation for {}", required);
            }
        }

        #[test]
        fn ability_scores_outside_range_rejected() {
            let mut input = fighter_input();
            input.ability_scores = Some(AbilityScoresInput::all([0, 31, 10, 10, 10, 10]));
            let err = validate_create(&input).unwrap_err();
            let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
            assert_eq!(fields, vec!["abilityScores.strength", "abilityScores.dexterity"]);
        }

        #[test]
        fn armor_class_outside_range_rejected() {
            let mut input = fighter_input();
            input.armor_class = Some(31);
            assert!(matches!(validate_create(&input), Err(ValidationError::InvalidData(_))));
            input.armor_class = Some(0);
            assert!(matches!(validate_create(&input), Err(ValidationError::InvalidData(_))));
        }

        #[test]
        fn current_hit_points_above_maximum_rejected() {
            let mut input = fighter_input();
            input.hit_points = Some(HitPointsInput {
                maximum: Some(10),
                current: Some(11),
                temporary: None,
            });
            let err = validate_create(&input).unwrap_err();
            assert_eq!(err.violations()[0].field, "hitPoints.current");
        }

        #[test]
        fn negative_temporary_hit_points_rejected() {
            let mut input = fighter_input();
            input.hit_points = Some(HitPointsInput {
                maximum: Some(10),
                current: Some(10),
                temporary: Some(-1),
            });
            assert!(validate_create(&input).is_err());
        }

        #[test]
        fn duplicate_class_is_multiclass_error() {
            let mut input = fighter_input();
            input.classes = Some(vec![
                ClassInput::new("fighter", 10, "d10"),
                ClassInput::new("fighter", 11, "d10"),
            ]);
            let err = validate_create(&input).unwrap_err();
            assert_eq!(
                err,
                ValidationError::DuplicateClass {
                    class_name: "fighter".into()
                }
            );
        }

        #[test]
        fn total_level_above_twenty_is_level_error() {
            let mut input = fighter_input();
            input.classes = Some(vec![
                ClassInput::new("Fighter", 15, "d10"),
                ClassInput::new("Wizard", 6, "d6"),
            ]);
            assert_eq!(
                validate_create(&input).unwrap_err(),
                ValidationError::InvalidLevel { total: 21 }
            );
        }

        #[test]
        fn business_rules_wait_for_clean_schema() {
            let mut input = fighter_input();
            input.name = None;
            input.classes = Some(vec![
                ClassInput::new("Fighter", 15, "d10"),
                ClassInput::new("Fighter", 6, "d10"),
            ]);
            assert!(matches!(validate_create(&input), Err(ValidationError::InvalidData(_))));
        }

        #[test]
        fn unknown_skill_is_a_violation() {
            let mut input = fighter_input();
            input.skill_proficiencies = Some(vec!["Athletics".into(), "Juggling".into()]);
            let err = validate_create(&input).unwrap_err();
            assert_eq!(err.violations()[0].field, "skillProficiencies[1]");
        }

        #[test]
        fn equipment_defaults_and_checks() {
            let mut input = fighter_input();
            input.equipment = Some(vec![
                EquipmentInput {
                    name: Some("Rope".into()),
                    weight: Some(10.0),
                    ..Default::default()
                },
                EquipmentInput {
                    name: Some("Anvil".into()),
                    weight: Some(-5.0),
                    ..Default::default()
                },
            ]);
            let err = validate_create(&input).unwrap_err();
            assert_eq!(err.violations()[0].field, "equipment[1].weight");

            input.equipment.as_mut().unwrap().pop();
            let new = validate_create(&input).unwrap();
            assert_eq!(new.equipment[0].quantity, 1);
        }

        #[test]
        fn bad_class_entries_are_indexed() {
            let mut input = fighter_input();
            input.classes = Some(vec![
                ClassInput::new("Fighter", 3, "d10"),
                ClassInput {
                    class_name: Some("Wizard".into()),
                    level: Some(0),
                    subclass: None,
                    hit_die: Some("d20".into()),
                },
            ]);
            let err = validate_create(&input).unwrap_err();
            let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
            assert_eq!(fields, vec!["classes[1].level", "classes[1].hitDie"]);
        }
    }

    mod update {
        use super::*;

        #[test]
        fn empty_update_is_valid_and_empty() {
            let changes = validate_update(&CharacterInput::default()).unwrap();
            assert!(changes.is_empty());
        }

        #[test]
        fn only_supplied_fields_are_checked() {
            let input = CharacterInput {
                armor_class: Some(15),
                ability_scores: Some(AbilityScoresInput {
                    strength: Some(18),
                    ..Default::default()
                }),
                ..Default::default()
            };
            let changes = validate_update(&input).unwrap();
            assert_eq!(changes.armor_class, Some(15));
            assert_eq!(changes.ability_scores.len(), 1);
            assert_eq!(changes.ability_scores[0].0, Ability::Strength);
            assert!(changes.name.is_none());
        }

        #[test]
        fn supplied_invalid_fields_are_rejected() {
            let input = CharacterInput {
                name: Some("   ".into()),
                speed: Some(-10),
                ..Default::default()
            };
            let err = validate_update(&input).unwrap_err();
            assert_eq!(err.violations().len(), 2);
        }

        #[test]
        fn classes_in_update_run_business_rules() {
            let input = CharacterInput {
                classes: Some(vec![
                    ClassInput::new("Fighter", 10, "d10"),
                    ClassInput::new("FIGHTER", 1, "d10"),
                ]),
                ..Default::default()
            };
            assert!(matches!(
                validate_update(&input),
                Err(ValidationError::DuplicateClass { .. })
            ));
        }

        #[test]
        fn partial_hit_points_checked_within_payload() {
            let input = CharacterInput {
                hit_points: Some(HitPointsInput {
                    maximum: Some(5),
                    current: Some(9),
                    temporary: None,
                }),
                ..Default::default()
            };
            assert!(validate_update(&input).is_err());

            let input = CharacterInput {
                hit_points: Some(HitPointsInput {
                    maximum: None,
                    current: Some(9),
                    temporary: None,
                }),
                ..Default::default()
            };
            let changes = validate_update(&input).unwrap();
            assert_eq!(changes.hit_points.unwrap().current, Some(9));
        }
    }
}
