//! Error taxonomy for session transitions.
//!
//! Every variant here is recoverable by the caller's next step: the
//! controller runs every simulation tick and re-evaluates membership, so a
//! refused transition is logged and treated as a no-op rather than a failure.
//! Invariant violations (a ledger that no longer matches its participant
//! list) are not represented; they trip `debug_assert!` instead.

use crate::state::{AgentId, SessionId};

/// Severity level of an error, used for categorization and logging priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the same request may succeed on a later step.
    ///
    /// Examples: admission refused, agent already a member, unknown or
    /// already completed session
    Recoverable,

    /// The request was malformed: an agent the world does not know, or an
    /// agent paired with itself.
    Validation,

    /// Unexpected state inconsistency between the registry and the world.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Reasons a membership transition or damage record was not applied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleError {
    #[error("session {session} is not active")]
    UnknownSession { session: SessionId },

    #[error("session {session} has already finished")]
    AlreadyCompleted { session: SessionId },

    #[error("agent {agent} is not present in the world")]
    UnknownAgent { agent: AgentId },

    #[error("agent {agent} cannot start a battle against itself")]
    SelfEngagement { agent: AgentId },

    #[error("agent {agent} refused to change membership of {session}")]
    AdmissionRefused { session: SessionId, agent: AgentId },

    #[error("agent {agent} is already active in {session}")]
    AlreadyMember { session: SessionId, agent: AgentId },

    #[error("agent {agent} is not active in {session}")]
    NotMember { session: SessionId, agent: AgentId },

    #[error("agent {agent} cannot enter combat")]
    NoCombatCapability { agent: AgentId },

    #[error("agents {first} and {second} are both already in battle")]
    BothEngaged { first: AgentId, second: AgentId },

    #[error("agents {first} and {second} fight on the same side")]
    SameSide { first: AgentId, second: AgentId },

    #[error("agents {first} ({first_session}) and {second} ({second_session}) are in different sessions")]
    SplitSessions {
        first: AgentId,
        first_session: SessionId,
        second: AgentId,
        second_session: SessionId,
    },
}

impl BattleError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownAgent { .. } | Self::SelfEngagement { .. } => ErrorSeverity::Validation,
            Self::SplitSessions { .. } => ErrorSeverity::Internal,
            Self::UnknownSession { .. }
            | Self::AlreadyCompleted { .. }
            | Self::AdmissionRefused { .. }
            | Self::AlreadyMember { .. }
            | Self::NotMember { .. }
            | Self::NoCombatCapability { .. }
            | Self::BothEngaged { .. }
            | Self::SameSide { .. } => ErrorSeverity::Recoverable,
        }
    }

    /// Stable identifier for this variant, for logs and assertions.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSession { .. } => "UNKNOWN_SESSION",
            Self::AlreadyCompleted { .. } => "ALREADY_COMPLETED",
            Self::UnknownAgent { .. } => "UNKNOWN_AGENT",
            Self::SelfEngagement { .. } => "SELF_ENGAGEMENT",
            Self::AdmissionRefused { .. } => "ADMISSION_REFUSED",
            Self::AlreadyMember { .. } => "ALREADY_MEMBER",
            Self::NotMember { .. } => "NOT_MEMBER",
            Self::NoCombatCapability { .. } => "NO_COMBAT_CAPABILITY",
            Self::BothEngaged { .. } => "BOTH_ENGAGED",
            Self::SameSide { .. } => "SAME_SIDE",
            Self::SplitSessions { .. } => "SPLIT_SESSIONS",
        }
    }

    /// Emits a diagnostic for this refusal and hands it back for `Err(..)`.
    pub(crate) fn logged(self) -> Self {
        match self.severity() {
            ErrorSeverity::Internal => {
                tracing::warn!(code = self.error_code(), "{}", self);
            }
            _ => {
                tracing::debug!(code = self.error_code(), "{}", self);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusals_are_recoverable() {
        let err = BattleError::AdmissionRefused {
            session: SessionId(1),
            agent: AgentId(4),
        };
        assert!(err.severity().is_recoverable());
        assert_eq!(err.error_code(), "ADMISSION_REFUSED");
        assert_eq!(err.to_string(), "agent #4 refused to change membership of battle-1");
    }

    #[test]
    fn stale_session_ids_are_recoverable() {
        for err in [
            BattleError::UnknownSession {
                session: SessionId(9),
            },
            BattleError::AlreadyCompleted {
                session: SessionId(9),
            },
        ] {
            assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        }
    }

    #[test]
    fn unknown_agent_is_validation() {
        let err = BattleError::UnknownAgent { agent: AgentId(9) };
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.severity().as_str(), "validation");
    }

    #[test]
    fn self_engagement_is_validation() {
        let err = BattleError::SelfEngagement { agent: AgentId(2) };
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.to_string(), "agent #2 cannot start a battle against itself");
    }
}
