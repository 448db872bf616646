//! Allegiance, engagement state, and difficulty classification.

/// Tag names consulted when escalating a session's difficulty.
pub mod tags {
    /// Marks an elite combatant; escalates a session to at least [`super::Tier::Normal`].
    pub const ELITE: &str = "Elite";
    /// Marks a boss combatant; escalates a session to [`super::Tier::Hard`].
    pub const BOSS: &str = "Boss";
}

/// Agent allegiance within a combat session.
///
/// Side is mutable per agent: a [`Side::Neutral`] agent struck in combat is
/// reassigned to the side opposing its attacker.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Side {
    /// The player and their allies.
    Player,
    /// Bystanders that fight nobody until provoked.
    #[default]
    Neutral,
    /// Hostile to the player.
    Enemy,
}

impl Side {
    /// Returns the side an attacked neutral joins when struck by `self`.
    pub const fn opposite(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
            Side::Neutral => Side::Neutral,
        }
    }

    /// Player and Enemy are hostile to each other; Neutral is hostile to nobody.
    pub const fn is_hostile_to(self, other: Side) -> bool {
        matches!(
            (self, other),
            (Side::Player, Side::Enemy) | (Side::Enemy, Side::Player)
        )
    }
}

/// Per-agent engagement state.
///
/// The agent owns this value. `Warning` is informational and driven by the
/// agent's own perception; the session core only distinguishes "in battle"
/// from everything else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CombatState {
    #[default]
    Idle,
    Warning,
    Battle,
}

/// Difficulty classification of a session. Ordered; sessions only move up.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Tier {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Tier {
    /// Tier demanded by a single participant, given its tag lookup.
    pub fn for_tags(has_tag: impl Fn(&str) -> bool) -> Tier {
        if has_tag(tags::BOSS) {
            Tier::Hard
        } else if has_tag(tags::ELITE) {
            Tier::Normal
        } else {
            Tier::Easy
        }
    }
}

/// Condition that caused a session to form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TriggerType {
    /// Two idle agents detected each other.
    Standoff,
    /// One side struck an agent that was not yet in any session.
    SneakAttack,
}

/// Signed change applied to a participant's resources by one hit or heal.
///
/// Damage is negative, healing positive. Only `hp` feeds the damage ledger.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceDelta {
    pub hp: f32,
    pub mp: f32,
}

impl ResourceDelta {
    pub const fn new(hp: f32, mp: f32) -> Self {
        Self { hp, mp }
    }

    /// A pure hit-point loss of `amount` (stored negative).
    pub fn damage(amount: f32) -> Self {
        Self::new(-amount.abs(), 0.0)
    }

    /// A pure hit-point gain of `amount`.
    pub fn healing(amount: f32) -> Self {
        Self::new(amount.abs(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn opposite_swaps_hostile_sides() {
        assert_eq!(Side::Player.opposite(), Side::Enemy);
        assert_eq!(Side::Enemy.opposite(), Side::Player);
        assert_eq!(Side::Neutral.opposite(), Side::Neutral);
    }

    #[test]
    fn neutral_is_hostile_to_nobody() {
        assert!(Side::Player.is_hostile_to(Side::Enemy));
        assert!(!Side::Neutral.is_hostile_to(Side::Enemy));
        assert!(!Side::Player.is_hostile_to(Side::Player));
    }

    #[test]
    fn boss_outranks_elite() {
        assert_eq!(Tier::for_tags(|t| t == tags::BOSS || t == tags::ELITE), Tier::Hard);
        assert_eq!(Tier::for_tags(|t| t == tags::ELITE), Tier::Normal);
        assert_eq!(Tier::for_tags(|_| false), Tier::Easy);
        assert!(Tier::Hard > Tier::Normal && Tier::Normal > Tier::Easy);
    }

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!(Side::from_str("ENEMY").unwrap(), Side::Enemy);
        assert_eq!(Side::Player.to_string(), "player");
    }

    #[test]
    fn damage_is_negative() {
        assert_eq!(ResourceDelta::damage(15.0).hp, -15.0);
        assert_eq!(ResourceDelta::healing(-4.0).hp, 4.0);
    }
}
