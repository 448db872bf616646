//! Mutual-detection sampling over idle agents.
//!
//! Each step the manager snapshots the agents that are not in any session and
//! builds an `n×n` relation `detected[i][j]` ("agent i perceives agent j as
//! hostile") from each agent's own detected-enemy list. Only pairs that detect
//! each other become Standoff candidates; one-sided detection is left for the
//! agent's perception to escalate on a later step.

use std::collections::HashMap;

use crate::env::BattleWorld;
use crate::state::AgentId;

/// Unordered pair of idle agents that detect each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TriggerCandidate {
    pub first: AgentId,
    pub second: AgentId,
}

/// Boolean detection relation over a snapshot of idle agents.
#[derive(Clone, Debug, Default)]
pub struct DetectionMatrix {
    agents: Vec<AgentId>,
    cells: Vec<bool>,
}

impl DetectionMatrix {
    /// Samples `world` for the agents in `idle`. Detections of agents outside
    /// the snapshot are ignored.
    pub fn build(world: &dyn BattleWorld, idle: &[AgentId]) -> Self {
        let n = idle.len();
        let index: HashMap<AgentId, usize> = idle
            .iter()
            .enumerate()
            .map(|(slot, agent)| (*agent, slot))
            .collect();

        let mut cells = vec![false; n * n];
        for (i, agent) in idle.iter().enumerate() {
            let Some(combatant) = world.combatant(*agent) else {
                continue;
            };
            for target in combatant.detected_enemies() {
                if let Some(&j) = index.get(target)
                    && i != j
                {
                    cells[i * n + j] = true;
                }
            }
        }

        Self {
            agents: idle.to_vec(),
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    /// Returns true if snapshot slot `i` detects slot `j`.
    pub fn detects(&self, i: usize, j: usize) -> bool {
        let n = self.agents.len();
        i < n && j < n && self.cells[i * n + j]
    }

    /// Every `(i, j)` with `i < j` and mutual detection, in ascending order.
    pub fn mutual_pairs(&self) -> Vec<TriggerCandidate> {
        let n = self.agents.len();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if self.cells[i * n + j] && self.cells[j * n + i] {
                    pairs.push(TriggerCandidate {
                        first: self.agents[i],
                        second: self.agents[j],
                    });
                }
            }
        }
        pairs
    }
}
