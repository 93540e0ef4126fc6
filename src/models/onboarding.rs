use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::OnboardingError;

/// Signup steps in the order they unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupStep {
    Account,
    Profile,
    Training,
    Preferences,
}

impl SignupStep {
    pub const ALL: [SignupStep; 4] = [
        SignupStep::Account,
        SignupStep::Profile,
        SignupStep::Training,
        SignupStep::Preferences,
    ];

    pub fn next(self) -> Option<SignupStep> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }
}

impl std::fmt::Display for SignupStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignupStep::Account => write!(f, "account"),
            SignupStep::Profile => write!(f, "profile"),
            SignupStep::Training => write!(f, "training"),
            SignupStep::Preferences => write!(f, "preferences"),
        }
    }
}

impl std::str::FromStr for SignupStep {
    type Err = OnboardingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "account" => Ok(SignupStep::Account),
            "profile" => Ok(SignupStep::Profile),
            "training" => Ok(SignupStep::Training),
            "preferences" => Ok(SignupStep::Preferences),
            _ => Err(OnboardingError::UnknownStep(s.to_string())),
        }
    }
}

/// Signup progress as an explicit state machine.
///
/// Completing the current step unlocks the next one. The persisted form is
/// just the completed set, which must always be a prefix of [`SignupStep::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SignupSnapshot", into = "SignupSnapshot")]
pub struct SignupFlow {
    completed: BTreeSet<SignupStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SignupSnapshot {
    #[serde(default)]
    completed: Vec<SignupStep>,
}

impl TryFrom<SignupSnapshot> for SignupFlow {
    type Error = OnboardingError;

    fn try_from(snapshot: SignupSnapshot) -> Result<Self, Self::Error> {
        let completed: BTreeSet<SignupStep> = snapshot.completed.into_iter().collect();
        let expected: BTreeSet<SignupStep> = SignupStep::ALL
            .iter()
            .take(completed.len())
            .copied()
            .collect();
        if completed != expected {
            return Err(OnboardingError::InconsistentState(
                completed.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", "),
            ));
        }
        Ok(Self { completed })
    }
}

impl From<SignupFlow> for SignupSnapshot {
    fn from(flow: SignupFlow) -> Self {
        Self {
            completed: flow.completed.into_iter().collect(),
        }
    }
}

impl SignupFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// The step waiting to be completed, or `None` once signup is finished
    pub fn current_step(&self) -> Option<SignupStep> {
        SignupStep::ALL
            .iter()
            .copied()
            .find(|s| !self.completed.contains(s))
    }

    pub fn is_completed(&self, step: SignupStep) -> bool {
        self.completed.contains(&step)
    }

    /// A step is unlocked once every earlier step is complete
    pub fn is_unlocked(&self, step: SignupStep) -> bool {
        self.is_completed(step) || self.current_step() == Some(step)
    }

    pub fn is_finished(&self) -> bool {
        self.current_step().is_none()
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = SignupStep> + '_ {
        self.completed.iter().copied()
    }

    /// Complete `step` and return the step it unlocks.
    ///
    /// Re-completing a finished step is a no-op; completing a locked step
    /// fails without changing state.
    pub fn complete(&mut self, step: SignupStep) -> Result<Option<SignupStep>, OnboardingError> {
        if self.is_completed(step) {
            return Ok(self.current_step());
        }

        match self.current_step() {
            Some(current) if current == step => {
                self.completed.insert(step);
                tracing::debug!("Completed signup step {}", step);
                Ok(step.next())
            }
            Some(current) => Err(OnboardingError::StepLocked {
                step: step.to_string(),
                current: current.to_string(),
            }),
            None => Ok(None),
        }
    }

    pub fn to_json(&self) -> Result<String, OnboardingError> {
        serde_json::to_string(self).map_err(|e| OnboardingError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, OnboardingError> {
        serde_json::from_str(json).map_err(|e| OnboardingError::Serialization(e.to_string()))
    }
}
