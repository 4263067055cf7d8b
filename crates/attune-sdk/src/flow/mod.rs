//! Journal entry flow coordinator
//!
//! A four-step wizard: primary emotion, optional secondary emotion,
//! optional self-care strategy, review. The coordinator owns the
//! selection record and the catalog scope, publishes immutable
//! [`FlowSnapshot`]s through a watch channel, and guarantees
//! single-writer semantics: overlapping mutations resolve as "last
//! completed action wins", and a cancelled submission applies zero
//! mutation to the selection.

use crate::cache::SessionCache;
use crate::error::{CoreError, Result};
use attune_types::{Catalog, CurriculumEntry, InitiatedBy, JournalEntry, Layer, NewJournalEntry, StrategyEntry};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Steps of the entry-logging wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlowStep {
    PrimaryEmotion,
    SecondaryEmotion,
    StrategySelection,
    Review,
}

/// The user's selections for one wizard invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowSelection {
    pub primary_curriculum_id: Option<i64>,
    pub secondary_curriculum_id: Option<i64>,
    pub strategy_id: Option<i64>,
    pub initiated_by: InitiatedBy,
}

/// Which part of the catalog the current step exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogScope {
    /// Emotion layers only (layer 0 excluded)
    #[default]
    EmotionLayers,
    /// The self-care strategy layer only
    StrategyLayer,
}

/// Immutable state snapshot published to the host UI.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSnapshot {
    pub step: FlowStep,
    pub selection: FlowSelection,
    pub scope: CatalogScope,
    /// Strategy-layer phase matching the primary emotion's phase,
    /// pre-selected when entering strategy selection
    pub preselected_phase_id: Option<i64>,
    /// Last submission failure, kept for the review screen to offer an
    /// explicit retry
    pub submit_error: Option<String>,
}

/// Collaborator that persists a finished journal entry.
#[async_trait]
pub trait SubmitJournal: Send + Sync {
    async fn submit(&self, entry: &NewJournalEntry) -> Result<JournalEntry>;
}

struct FlowState {
    step: FlowStep,
    selection: FlowSelection,
    scope: CatalogScope,
    preselected_phase_id: Option<i64>,
    submit_error: Option<String>,
    /// True while a submission is awaiting the collaborator; a second
    /// submit is rejected rather than reaching the collaborator twice
    submitting: bool,
    /// Bumped on every reset; a submission outcome from an older epoch
    /// is discarded without touching state
    epoch: u64,
}

impl FlowState {
    fn fresh(epoch: u64) -> Self {
        Self {
            step: FlowStep::PrimaryEmotion,
            selection: FlowSelection::default(),
            scope: CatalogScope::EmotionLayers,
            preselected_phase_id: None,
            submit_error: None,
            submitting: false,
            epoch,
        }
    }

    fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            step: self.step,
            selection: self.selection.clone(),
            scope: self.scope,
            preselected_phase_id: self.preselected_phase_id,
            submit_error: self.submit_error.clone(),
        }
    }
}

/// The journal entry wizard state machine.
pub struct FlowCoordinator {
    catalog: Arc<Catalog>,
    submitter: Arc<dyn SubmitJournal>,
    cache: Option<Arc<SessionCache>>,
    state: Mutex<FlowState>,
    tx: watch::Sender<FlowSnapshot>,
}

impl FlowCoordinator {
    pub fn new(catalog: Arc<Catalog>, submitter: Arc<dyn SubmitJournal>) -> Self {
        let initial = FlowState::fresh(0);
        let (tx, _rx) = watch::channel(initial.snapshot());
        Self {
            catalog,
            submitter,
            cache: None,
            state: Mutex::new(initial),
            tx,
        }
    }

    /// Record successful submissions into a session cache so local
    /// analytics fallback sees fresh entries.
    pub fn with_cache(mut self, cache: Arc<SessionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Subscribe to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.tx.subscribe()
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> FlowSnapshot {
        self.tx.borrow().clone()
    }

    /// Current wizard step.
    pub fn step(&self) -> FlowStep {
        self.tx.borrow().step
    }

    /// Whether `advance` is permitted from the current step. Only the
    /// primary emotion is mandatory; later steps may be skipped.
    pub fn can_proceed(&self) -> bool {
        let snapshot = self.tx.borrow();
        match snapshot.step {
            FlowStep::PrimaryEmotion => snapshot.selection.primary_curriculum_id.is_some(),
            FlowStep::SecondaryEmotion | FlowStep::StrategySelection => true,
            FlowStep::Review => false,
        }
    }

    /// Layers visible under the current catalog scope.
    pub fn visible_layers(&self) -> Vec<&Layer> {
        match self.tx.borrow().scope {
            CatalogScope::EmotionLayers => self.catalog.emotion_layers().collect(),
            CatalogScope::StrategyLayer => {
                self.catalog.strategy_layer().into_iter().collect()
            }
        }
    }

    /// Start a fresh wizard invocation.
    pub async fn begin(&self, initiated_by: InitiatedBy) {
        let mut state = self.state.lock().await;
        *state = FlowState::fresh(state.epoch + 1);
        state.selection.initiated_by = initiated_by;
        self.publish(&state);
    }

    /// Select an emotion curriculum entry for the current step.
    ///
    /// At the primary step this also narrows the catalog to emotion
    /// layers. At the secondary step, choosing the primary again is a
    /// validation error and leaves state untouched.
    pub async fn select_curriculum(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.step {
            FlowStep::PrimaryEmotion => {
                state.selection.primary_curriculum_id = Some(id);
                // A secondary equal to the new primary would violate the
                // distinctness invariant after an edit-back.
                if state.selection.secondary_curriculum_id == Some(id) {
                    state.selection.secondary_curriculum_id = None;
                }
                state.scope = CatalogScope::EmotionLayers;
            }
            FlowStep::SecondaryEmotion => {
                if state.selection.primary_curriculum_id == Some(id) {
                    return Err(CoreError::DuplicateSecondary(id));
                }
                state.selection.secondary_curriculum_id = Some(id);
            }
            step => return Err(CoreError::InvalidTransition(step)),
        }
        self.publish(&state);
        Ok(())
    }

    /// Drop the secondary selection; skipping it stays a valid path.
    pub async fn clear_secondary(&self) {
        let mut state = self.state.lock().await;
        state.selection.secondary_curriculum_id = None;
        self.publish(&state);
    }

    /// Select a self-care strategy. Only valid during strategy
    /// selection; strategy choice itself is optional.
    pub async fn select_strategy(&self, id: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.step != FlowStep::StrategySelection {
            return Err(CoreError::InvalidTransition(state.step));
        }
        state.selection.strategy_id = Some(id);
        self.publish(&state);
        Ok(())
    }

    /// Explicitly skip the strategy, leaving it unset.
    pub async fn clear_strategy(&self) {
        let mut state = self.state.lock().await;
        state.selection.strategy_id = None;
        self.publish(&state);
    }

    /// Move to the next step. Gated by `can_proceed`; entering strategy
    /// selection narrows the catalog to the strategy layer and
    /// pre-selects the phase matching the primary emotion's phase.
    pub async fn advance(&self) -> Result<FlowStep> {
        let mut state = self.state.lock().await;
        let next = match state.step {
            FlowStep::PrimaryEmotion => {
                if state.selection.primary_curriculum_id.is_none() {
                    return Err(CoreError::MissingPrimary);
                }
                FlowStep::SecondaryEmotion
            }
            FlowStep::SecondaryEmotion => {
                state.scope = CatalogScope::StrategyLayer;
                state.preselected_phase_id = self.matching_strategy_phase(&state);
                FlowStep::StrategySelection
            }
            FlowStep::StrategySelection => FlowStep::Review,
            FlowStep::Review => return Err(CoreError::InvalidTransition(FlowStep::Review)),
        };
        state.step = next;
        self.publish(&state);
        Ok(next)
    }

    /// Return from review to the first step with selections preserved.
    pub async fn edit_back(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.step != FlowStep::Review {
            return Err(CoreError::InvalidTransition(state.step));
        }
        state.step = FlowStep::PrimaryEmotion;
        state.scope = CatalogScope::EmotionLayers;
        state.preselected_phase_id = None;
        state.submit_error = None;
        self.publish(&state);
        Ok(())
    }

    /// Resolve the primary selection against the catalog. `None` when
    /// unset or the id is no longer catalogued.
    pub fn primary_curriculum(&self) -> Option<&CurriculumEntry> {
        let id = self.tx.borrow().selection.primary_curriculum_id?;
        self.catalog.find_curriculum(id)
    }

    /// Resolve the secondary selection against the catalog.
    pub fn secondary_curriculum(&self) -> Option<&CurriculumEntry> {
        let id = self.tx.borrow().selection.secondary_curriculum_id?;
        self.catalog.find_curriculum(id)
    }

    /// Resolve the strategy selection against the catalog.
    pub fn strategy(&self) -> Option<&StrategyEntry> {
        let id = self.tx.borrow().selection.strategy_id?;
        self.catalog.find_strategy(id)
    }

    /// Submit the finished entry through the collaborator.
    ///
    /// At most one submission is in flight at a time; a second submit
    /// while one is pending is rejected before it reaches the
    /// collaborator. On success the flow resets to its initial state
    /// and the entry is recorded into the session cache. On failure the
    /// flow stays at review with the error surfaced for an explicit
    /// retry - the entry is never dropped or auto-resubmitted. If the
    /// flow is cancelled while the submission is in flight, the outcome
    /// is discarded and no state changes.
    pub async fn submit(&self) -> Result<JournalEntry> {
        let (payload, epoch) = {
            let mut state = self.state.lock().await;
            let primary = state
                .selection
                .primary_curriculum_id
                .ok_or(CoreError::MissingPrimary)?;
            if state.step != FlowStep::Review {
                return Err(CoreError::InvalidTransition(state.step));
            }
            if state.submitting {
                return Err(CoreError::SubmissionInFlight);
            }
            state.submitting = true;
            let payload = NewJournalEntry {
                curriculum_id: primary,
                secondary_curriculum_id: state.selection.secondary_curriculum_id,
                strategy_id: state.selection.strategy_id,
                initiated_by: state.selection.initiated_by,
            };
            (payload, state.epoch)
        };

        let outcome = self.submitter.submit(&payload).await;

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            tracing::debug!("discarding submission outcome from a cancelled flow");
            return Err(CoreError::SubmissionCancelled);
        }

        match outcome {
            Ok(entry) => {
                *state = FlowState::fresh(state.epoch + 1);
                self.publish(&state);
                drop(state);
                if let Some(cache) = &self.cache {
                    cache.record_entry(entry.clone()).await;
                }
                Ok(entry)
            }
            Err(err) => {
                tracing::warn!("journal submission failed: {}", err);
                state.submitting = false;
                state.submit_error = Some(err.to_string());
                self.publish(&state);
                Err(err)
            }
        }
    }

    /// Clear all selections and the catalog scope, returning to the
    /// first step. Also invalidates any in-flight submission.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = FlowState::fresh(state.epoch + 1);
        self.publish(&state);
    }

    /// Cancelling the flow always resets it.
    pub async fn cancel(&self) {
        self.reset().await;
    }

    /// Strategy-layer phase whose name matches the phase containing the
    /// primary curriculum entry. Phase names are unique per catalog, so
    /// the match is by name across layers, not by id.
    fn matching_strategy_phase(&self, state: &FlowState) -> Option<i64> {
        let primary = state.selection.primary_curriculum_id?;
        let located = self.catalog.locate_curriculum(primary)?;
        self.catalog
            .strategy_layer()?
            .phases
            .iter()
            .find(|phase| phase.name == located.phase.name)
            .map(|phase| phase.id)
    }

    fn publish(&self, state: &FlowState) {
        self.tx.send_replace(state.snapshot());
    }
}

#[cfg(test)]
mod tests;

