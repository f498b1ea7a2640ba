//! Stage definitions for the multi-stage countdown.
//!
//! A stage's identity is the [`Uuid`] assigned at creation; display order is
//! derived from position in the plan and never used as identity, so adding or
//! removing stages cannot collide identifiers.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::countdown::error::CountdownError;

/// Default name given to the first stage of a fresh plan.
pub const DEFAULT_STAGE_NAME: &str = "Timer 1";

/// Default duration of a fresh plan's single stage.
pub const DEFAULT_STAGE_DURATION: Duration = Duration::from_secs(30);

// ============================================================================
// Stage
// ============================================================================

/// One named countdown segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    id: Uuid,
    /// Display name.
    pub name: String,
    /// Stage length. Zero is allowed; zero-duration stages are skipped when
    /// the chain runs.
    pub duration: Duration,
}

impl Stage {
    /// Creates a stage with a fresh immutable identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            duration,
        }
    }

    /// The immutable identifier assigned at creation.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }
}

// ============================================================================
// StagePlan
// ============================================================================

/// The editable stage configuration. Always holds at least one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlan {
    stages: Vec<Stage>,
}

impl Default for StagePlan {
    fn default() -> Self {
        Self::new(Stage::new(DEFAULT_STAGE_NAME, DEFAULT_STAGE_DURATION))
    }
}

impl StagePlan {
    /// Creates a plan with a single stage.
    #[must_use]
    pub fn new(first: Stage) -> Self {
        Self {
            stages: vec![first],
        }
    }

    /// Creates a plan from a non-empty stage list.
    ///
    /// # Errors
    ///
    /// Returns [`CountdownError::LastStage`] when `stages` is empty.
    pub fn from_stages(stages: Vec<Stage>) -> Result<Self, CountdownError> {
        if stages.is_empty() {
            return Err(CountdownError::LastStage);
        }
        Ok(Self { stages })
    }

    /// The stages in display order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; the plan never holds fewer than one stage.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Appends a stage.
    pub fn add(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    /// Removes the stage at `index`.
    ///
    /// # Errors
    ///
    /// Fails with [`CountdownError::LastStage`] when only one stage remains,
    /// or [`CountdownError::StageOutOfRange`] for a bad index.
    pub fn remove(&mut self, index: usize) -> Result<Stage, CountdownError> {
        if self.stages.len() <= 1 {
            return Err(CountdownError::LastStage);
        }
        if index >= self.stages.len() {
            return Err(CountdownError::StageOutOfRange(index));
        }
        Ok(self.stages.remove(index))
    }

    /// Renames the stage at `index`.
    ///
    /// # Errors
    ///
    /// Fails with [`CountdownError::StageOutOfRange`] for a bad index.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<(), CountdownError> {
        let stage = self
            .stages
            .get_mut(index)
            .ok_or(CountdownError::StageOutOfRange(index))?;
        stage.name = name.into();
        Ok(())
    }

}

/// Index of the first stage at or after `from` with a positive duration.
/// Zero-duration stages are never runnable; a run skips straight past them.
#[must_use]
pub fn first_runnable(stages: &[Stage], from: usize) -> Option<usize> {
    stages
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, s)| !s.duration.is_zero())
        .map(|(i, _)| i)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    mod stage_tests {
        use super::*;

        #[test]
        fn test_new_assigns_unique_ids() {
            let a = Stage::new("A", secs(1));
            let b = Stage::new("A", secs(1));
            assert_ne!(a.id(), b.id());
        }

        #[test]
        fn test_id_survives_rename() {
            let mut plan = StagePlan::new(Stage::new("A", secs(1)));
            let id = plan.stages()[0].id();
            plan.rename(0, "B").unwrap();
            assert_eq!(plan.stages()[0].id(), id);
            assert_eq!(plan.stages()[0].name, "B");
        }
    }

    mod plan_tests {
        use super::*;

        #[test]
        fn test_default_plan() {
            let plan = StagePlan::default();
            assert_eq!(plan.len(), 1);
            assert_eq!(plan.stages()[0].name, DEFAULT_STAGE_NAME);
            assert_eq!(plan.stages()[0].duration, DEFAULT_STAGE_DURATION);
        }

        #[test]
        fn test_from_stages_rejects_empty() {
            assert_eq!(
                StagePlan::from_stages(Vec::new()).unwrap_err(),
                CountdownError::LastStage
            );
        }

        #[test]
        fn test_add_and_remove() {
            let mut plan = StagePlan::new(Stage::new("A", secs(1)));
            plan.add(Stage::new("B", secs(2)));
            plan.add(Stage::new("C", secs(3)));
            assert_eq!(plan.len(), 3);

            let removed = plan.remove(1).unwrap();
            assert_eq!(removed.name, "B");
            assert_eq!(plan.len(), 2);
            assert_eq!(plan.stages()[1].name, "C");
        }

        #[test]
        fn test_remove_last_stage_forbidden() {
            let mut plan = StagePlan::new(Stage::new("A", secs(1)));
            assert_eq!(plan.remove(0).unwrap_err(), CountdownError::LastStage);
            assert_eq!(plan.len(), 1);
        }

        #[test]
        fn test_remove_out_of_range() {
            let mut plan = StagePlan::new(Stage::new("A", secs(1)));
            plan.add(Stage::new("B", secs(2)));
            assert_eq!(
                plan.remove(5).unwrap_err(),
                CountdownError::StageOutOfRange(5)
            );
        }

        #[test]
        fn test_ids_stable_across_removal() {
            let mut plan = StagePlan::new(Stage::new("A", secs(1)));
            plan.add(Stage::new("B", secs(2)));
            plan.add(Stage::new("C", secs(3)));
            let id_c = plan.stages()[2].id();

            plan.remove(0).unwrap();
            // C moved to position 1 but kept its identity.
            assert_eq!(plan.stages()[1].id(), id_c);
        }

        #[test]
        fn test_rename_out_of_range() {
            let mut plan = StagePlan::default();
            assert_eq!(
                plan.rename(3, "X").unwrap_err(),
                CountdownError::StageOutOfRange(3)
            );
        }

        #[test]
        fn test_first_runnable_skips_zero_durations() {
            let mut plan = StagePlan::new(Stage::new("A", secs(0)));
            plan.add(Stage::new("B", secs(0)));
            plan.add(Stage::new("C", secs(3)));

            assert_eq!(first_runnable(plan.stages(), 0), Some(2));
            assert_eq!(first_runnable(plan.stages(), 3), None);
        }

        #[test]
        fn test_first_runnable_all_zero() {
            let plan = StagePlan::new(Stage::new("A", secs(0)));
            assert_eq!(first_runnable(plan.stages(), 0), None);
        }
    }
}
