use core::fmt;

/// Lifecycle of a [`ProducerOrchestrator`].
///
/// ```text
/// Idle ──start──▶ Running ──all producers joined──▶ Sorting ──▶ Completed
///                    ▲                                             │
///                    └──────────────────start──────────────────────┘
/// ```
///
/// A run whose `start` future is dropped before completion falls back to
/// `Idle`.
///
/// [`ProducerOrchestrator`]: crate::ProducerOrchestrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Sorting,
    Completed,
}

impl RunState {
    /// `true` while producers are writing or the result is being sorted.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Sorting)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Sorting => "sorting",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}
