//! Unified error types surfaced by the runtime API.
//!
//! Wraps refusals from the battle core and content loading failures so
//! clients can bubble them up with consistent context.
use battle_core::{AgentId, BattleError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("failed to load battle content")]
    Content(#[source] anyhow::Error),

    #[error("agent {agent} is not present in the world")]
    UnknownAgent { agent: AgentId },

    #[error("agent {agent} is already present in the world")]
    DuplicateAgent { agent: AgentId },

    #[error("fixed-step period must be non-zero")]
    ZeroPeriod,
}

impl RuntimeError {
    /// Refusals the simulation shrugs off; everything else should surface.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RuntimeError::Battle(err) => err.severity().is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::SessionId;

    #[test]
    fn battle_refusals_pass_through() {
        let refusal = BattleError::UnknownSession {
            session: SessionId(3),
        };
        let err: RuntimeError = refusal.clone().into();
        assert_eq!(err.to_string(), refusal.to_string());
        assert!(err.is_recoverable());

        let unknown: RuntimeError = BattleError::UnknownAgent { agent: AgentId(2) }.into();
        assert!(!unknown.is_recoverable());
    }

    #[test]
    fn content_errors_keep_their_source() {
        let err = RuntimeError::Content(anyhow::anyhow!("missing cues.ron"));
        assert!(!err.is_recoverable());
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("missing cues.ron"));
    }
}
