//! Level, proficiency and experience progression.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::game_systems::XP_THRESHOLDS;
use crate::value_objects::ClassList;

/// Sum of all class levels.
pub fn total_level(classes: &ClassList) -> u32 {
    classes.total_level()
}

/// `2 + floor((total_level - 1) / 4)`: +2 at level 1, +6 at level 17.
pub fn proficiency_bonus(total_level: u32) -> i32 {
    let steps = total_level.saturating_sub(1) / 4;
    2 + i32::try_from(steps).unwrap_or(i32::MAX - 2)
}

/// Cumulative XP needed to reach each level. Index is level - 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct XpTable(Vec<u32>);

impl XpTable {
    /// The 20-level table from the 5e SRD.
    pub fn standard() -> Self {
        Self(XP_THRESHOLDS.to_vec())
    }

    /// A custom table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if the table is empty or not
    /// strictly increasing.
    pub fn new(thresholds: Vec<u32>) -> Result<Self, DomainError> {
        if thresholds.is_empty() {
            return Err(DomainError::constraint("XP table must not be empty"));
        }
        if let Some(i) = thresholds.windows(2).position(|w| w[0] >= w[1]) {
            return Err(DomainError::constraint(format!(
                "XP table must be strictly increasing (level {} is {}, level {} is {})",
                i + 1,
                thresholds[i],
                i + 2,
                thresholds[i + 1]
            )));
        }
        Ok(Self(thresholds))
    }

    pub fn max_level(&self) -> u32 {
        u32::try_from(self.0.len()).unwrap_or(u32::MAX)
    }

    /// Highest level whose threshold `xp` meets. Never below 1.
    pub fn level_for(&self, xp: u32) -> u32 {
        let reached = self.0.iter().take_while(|&&threshold| xp >= threshold).count();
        u32::try_from(reached.max(1)).unwrap_or(u32::MAX)
    }

    /// Threshold for a 1-based level, clamped to the table.
    fn threshold(&self, level: u32) -> u32 {
        let index = usize::try_from(level.saturating_sub(1)).unwrap_or(usize::MAX);
        self.0
            .get(index)
            .or(self.0.last())
            .copied()
            .unwrap_or_default()
    }

    pub fn experience_info(&self, xp: u32) -> ExperienceInfo {
        let current_level = self.level_for(xp);
        let is_max_level = current_level >= self.max_level();
        let next_level_xp = if is_max_level {
            self.threshold(self.max_level())
        } else {
            self.threshold(current_level + 1)
        };
        ExperienceInfo {
            current_xp: xp,
            current_level,
            next_level_xp,
            xp_to_next_level: if is_max_level {
                0
            } else {
                next_level_xp.saturating_sub(xp)
            },
            is_max_level,
        }
    }
}

impl Default for XpTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<u32>> for XpTable {
    type Error = DomainError;

    fn try_from(thresholds: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(thresholds)
    }
}

impl From<XpTable> for Vec<u32> {
    fn from(table: XpTable) -> Self {
        table.0
    }
}

/// Experience progression snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceInfo {
    #[serde(rename = "currentXP")]
    pub current_xp: u32,
    pub current_level: u32,
    #[serde(rename = "nextLevelXP")]
    pub next_level_xp: u32,
    #[serde(rename = "xpToNextLevel")]
    pub xp_to_next_level: u32,
    pub is_max_level: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_scales_every_four_levels() {
        let expected = [
            (1, 2),
            (4, 2),
            (5, 3),
            (8, 3),
            (9, 4),
            (12, 4),
            (13, 5),
            (16, 5),
            (17, 6),
            (20, 6),
        ];
        for (level, bonus) in expected {
            assert_eq!(proficiency_bonus(level), bonus, "level {}", level);
        }
    }

    #[test]
    fn level_for_thresholds() {
        let table = XpTable::standard();
        assert_eq!(table.level_for(0), 1);
        assert_eq!(table.level_for(299), 1);
        assert_eq!(table.level_for(300), 2);
        assert_eq!(table.level_for(6500), 5);
        assert_eq!(table.level_for(355_000), 20);
        assert_eq!(table.level_for(u32::MAX), 20);
    }

    #[test]
    fn experience_info_mid_table() {
        let info = XpTable::standard().experience_info(1000);
        assert_eq!(
            info,
            ExperienceInfo {
                current_xp: 1000,
                current_level: 3,
                next_level_xp: 2700,
                xp_to_next_level: 1700,
                is_max_level: false,
            }
        );
    }

    #[test]
    fn experience_info_at_max_level() {
        let info = XpTable::standard().experience_info(400_000);
        assert!(info.is_max_level);
        assert_eq!(info.current_level, 20);
        assert_eq!(info.next_level_xp, 355_000);
        assert_eq!(info.xp_to_next_level, 0);
    }

    #[test]
    fn experience_info_contract_names() {
        let json = serde_json::to_value(XpTable::standard().experience_info(0)).unwrap();
        for key in ["currentXP", "currentLevel", "nextLevelXP", "xpToNextLevel", "isMaxLevel"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn custom_tables_are_checked() {
        assert!(XpTable::new(vec![]).is_err());
        assert!(XpTable::new(vec![0, 100, 100]).is_err());
        let short = XpTable::new(vec![0, 10, 30]).unwrap();
        assert_eq!(short.max_level(), 3);
        assert!(short.experience_info(30).is_max_level);
        assert_eq!(short.experience_info(15).next_level_xp, 30);
    }
}
