//! Fixed-step battle runtime.
//!
//! The runtime owns the [`BattleManager`], the in-memory world, the mixer and
//! the cue table, advances them one step at a time, and publishes the events
//! each step produced on the [`EventBus`].

use std::time::Duration;

use battle_content::{ContentFactory, CueTable};
use battle_core::{
    AgentId, BattleConfig, BattleEnv, BattleManager, ResourceDelta, SessionId, StepSummary,
};
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::world::{Mixer, SimAgent, SimWorld};

/// Runtime configuration shared across the orchestrator and the event bus.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            event_buffer_size: 100,
        }
    }
}

/// Main runtime that drives battle sessions over an in-memory world.
pub struct BattleRuntime {
    manager: BattleManager,
    world: SimWorld,
    mixer: Mixer,
    cues: CueTable,
    bus: EventBus,
}

impl BattleRuntime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn manager(&self) -> &BattleManager {
        &self.manager
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SimWorld {
        &mut self.world
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn cues(&self) -> &CueTable {
        &self.cues
    }

    /// Cloneable handle to the event bus.
    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    pub fn spawn(&mut self, agent: SimAgent) -> Result<()> {
        self.world.spawn(agent)
    }

    /// Runs one fixed step: perception, the battle sweep, then event publishing.
    pub fn step(&mut self) -> StepSummary {
        self.world.perceive();
        let summary = {
            let mut env = BattleEnv::new(&mut self.world, &mut self.mixer, &self.cues);
            self.manager.step(&mut env)
        };
        self.publish_pending();
        summary
    }

    /// `attacker` hits `target` for `damage` hit points.
    ///
    /// The hit is booked first; if the battle core refuses it (same side,
    /// split sessions, refused admission) the target is left unharmed.
    pub fn attack(&mut self, attacker: AgentId, target: AgentId, damage: f32) -> Result<SessionId> {
        for agent in [attacker, target] {
            if self.world.agent(agent).is_none() {
                return Err(RuntimeError::UnknownAgent { agent });
            }
        }

        let delta = ResourceDelta::damage(damage);
        let session = {
            let mut env = BattleEnv::new(&mut self.world, &mut self.mixer, &self.cues);
            self.manager.record_battle(&mut env, attacker, target, delta)
        };
        let session = match session {
            Ok(session) => session,
            Err(err) => {
                self.publish_pending();
                return Err(err.into());
            }
        };

        if let Some(agent) = self.world.agent_mut(target) {
            agent.apply(delta);
        }
        self.publish_pending();
        Ok(session)
    }

    /// Finishes every session, as on world teardown.
    pub fn shutdown(&mut self) -> usize {
        let finished = {
            let mut env = BattleEnv::new(&mut self.world, &mut self.mixer, &self.cues);
            self.manager.shutdown(&mut env)
        };
        self.publish_pending();
        finished
    }

    /// Runs `steps` fixed steps, one per `period`.
    pub async fn run_steps(&mut self, period: Duration, steps: usize) -> Result<Vec<StepSummary>> {
        let mut summaries = Vec::with_capacity(steps);
        if steps == 0 {
            return Ok(summaries);
        }
        self.run_until(period, |summary| {
            summaries.push(summary.clone());
            summaries.len() >= steps
        })
        .await?;
        Ok(summaries)
    }

    /// Steps once per `period` until `stop` returns true for a step's summary.
    ///
    /// Returns the number of steps taken. Late ticks are delayed rather than
    /// bunched up.
    pub async fn run_until<F>(&mut self, period: Duration, mut stop: F) -> Result<usize>
    where
        F: FnMut(&StepSummary) -> bool,
    {
        if period.is_zero() {
            return Err(RuntimeError::ZeroPeriod);
        }
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut steps = 0;
        loop {
            interval.tick().await;
            let summary = self.step();
            steps += 1;
            if stop(&summary) {
                tracing::debug!(steps, tick = %summary.tick, "fixed-step loop stopped");
                return Ok(steps);
            }
        }
    }

    fn publish_pending(&mut self) {
        let tick = self.manager.clock();
        for battle in self.manager.drain_events() {
            self.bus.publish(Event::new(tick, battle));
        }
    }
}

/// Builder for [`BattleRuntime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    cues: CueTable,
    agents: Vec<SimAgent>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            cues: CueTable::default(),
            agents: Vec::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn battle_config(mut self, battle: BattleConfig) -> Self {
        self.config.battle = battle;
        self
    }

    pub fn cues(mut self, cues: CueTable) -> Self {
        self.cues = cues;
        self
    }

    /// Loads `config.toml` and `cues.ron` through `factory`.
    pub fn content(mut self, factory: &ContentFactory) -> Result<Self> {
        self.config.battle = factory.load_config().map_err(RuntimeError::Content)?;
        self.cues = factory.load_cues().map_err(RuntimeError::Content)?;
        Ok(self)
    }

    pub fn agent(mut self, agent: SimAgent) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn build(self) -> Result<BattleRuntime> {
        let mut world = SimWorld::new();
        for agent in self.agents {
            world.spawn(agent)?;
        }
        tracing::info!(
            agents = world.len(),
            cues = self.cues.len(),
            observer = ?self.config.battle.observer,
            "battle runtime ready"
        );
        Ok(BattleRuntime {
            manager: BattleManager::new(self.config.battle),
            world,
            mixer: Mixer::new(),
            cues: self.cues,
            bus: EventBus::with_capacity(self.config.event_buffer_size),
        })
    }
}
