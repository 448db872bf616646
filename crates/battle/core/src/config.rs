use crate::state::AgentId;

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Lower bound for a session's field radius, regardless of how close the
    /// triggering agents stand.
    pub minimum_field_radius: f32,

    /// Slack added to half the trigger distance when sizing a new field.
    pub field_margin: f32,

    /// The viewing agent whose membership drives audio bindings and kill
    /// signals. `None` runs headless with no observer.
    pub observer: Option<AgentId>,
}

impl BattleConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MINIMUM_FIELD_RADIUS: f32 = 10.0;
    pub const DEFAULT_FIELD_MARGIN: f32 = 3.0;

    pub fn new() -> Self {
        Self {
            minimum_field_radius: Self::DEFAULT_MINIMUM_FIELD_RADIUS,
            field_margin: Self::DEFAULT_FIELD_MARGIN,
            observer: Some(AgentId::PLAYER),
        }
    }

    pub fn with_minimum_field_radius(mut self, radius: f32) -> Self {
        self.minimum_field_radius = radius.max(0.0);
        self
    }

    pub fn with_field_margin(mut self, margin: f32) -> Self {
        self.field_margin = margin;
        self
    }

    pub fn with_observer(mut self, observer: Option<AgentId>) -> Self {
        self.observer = observer;
        self
    }

    /// Radius of a field formed by two agents `distance` apart.
    pub fn field_radius_for(&self, distance: f32) -> f32 {
        (distance * 0.5 + self.field_margin).max(self.minimum_field_radius)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_never_drops_below_minimum() {
        let config = BattleConfig::new().with_minimum_field_radius(10.0);
        assert_eq!(config.field_radius_for(6.0), 10.0);
        assert_eq!(config.field_radius_for(0.0), 10.0);
    }

    #[test]
    fn radius_grows_with_distance() {
        let config = BattleConfig::new()
            .with_minimum_field_radius(2.0)
            .with_field_margin(1.5);
        assert_eq!(config.field_radius_for(20.0), 11.5);
    }
}
