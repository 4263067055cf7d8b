use super::*;
use attune_types::Dosage;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

fn catalog() -> Arc<Catalog> {
    let json = serde_json::json!({
        "phase_order": ["rising", "peaking", "falling"],
        "layers": [
            {
                "id": 0,
                "color": "#888888",
                "title": "Self-care",
                "subtitle": "Strategies",
                "phases": [
                    {
                        "id": 100,
                        "name": "rising",
                        "strategies": [
                            {"id": 10, "strategy": "Breathing", "color": "#00ff00"},
                            {"id": 11, "strategy": "Walking", "color": "#0000ff"}
                        ]
                    },
                    {
                        "id": 101,
                        "name": "peaking",
                        "strategies": [
                            {"id": 12, "strategy": "Grounding", "color": "#ffff00"}
                        ]
                    }
                ]
            },
            {
                "id": 1,
                "color": "#ff0000",
                "title": "Anger",
                "subtitle": "Fire",
                "phases": [
                    {
                        "id": 1,
                        "name": "rising",
                        "medicinal": [
                            {"id": 1, "dosage": "medicinal", "expression": "Assertive"}
                        ],
                        "toxic": [
                            {"id": 2, "dosage": "toxic", "expression": "Explosive"}
                        ]
                    },
                    {
                        "id": 2,
                        "name": "peaking",
                        "medicinal": [
                            {"id": 3, "dosage": "medicinal", "expression": "Focused"}
                        ]
                    }
                ]
            }
        ]
    });
    Arc::new(serde_json::from_value(json).expect("test catalog should decode"))
}

struct MockSubmitter {
    calls: AtomicUsize,
    fail: bool,
    gate: Option<Arc<Notify>>,
}

impl MockSubmitter {
    fn ok() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), fail: false, gate: None })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), fail: true, gate: None })
    }

    fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), fail: false, gate: Some(gate) })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmitJournal for MockSubmitter {
    async fn submit(&self, entry: &NewJournalEntry) -> Result<JournalEntry> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(CoreError::Transport("connection refused".into()));
        }
        Ok(JournalEntry {
            id: 99,
            created_at: Utc::now(),
            curriculum_id: entry.curriculum_id,
            secondary_curriculum_id: entry.secondary_curriculum_id,
            strategy_id: entry.strategy_id,
            initiated_by: entry.initiated_by,
        })
    }
}

async fn flow_at_review(flow: &FlowCoordinator) {
    flow.begin(InitiatedBy::SelfStarted).await;
    flow.select_curriculum(1).await.unwrap();
    flow.advance().await.unwrap();
    flow.advance().await.unwrap();
    flow.advance().await.unwrap();
    assert_eq!(flow.step(), FlowStep::Review);
}

#[tokio::test]
async fn test_reset_returns_to_initial_state() {
    let flow = FlowCoordinator::new(catalog(), MockSubmitter::ok());
    flow.begin(InitiatedBy::Scheduled).await;
    flow.select_curriculum(1).await.unwrap();
    flow.advance().await.unwrap();
    flow.select_curriculum(3).await.unwrap();

    flow.reset().await;

    let snapshot = flow.snapshot();
    assert_eq!(snapshot.step, FlowStep::PrimaryEmotion);
    assert_eq!(snapshot.selection, FlowSelection::default());
    assert_eq!(snapshot.scope, CatalogScope::EmotionLayers);
    assert!(snapshot.preselected_phase_id.is_none());
}

#[tokio::test]
async fn test_advance_requires_primary_selection() {
    let flow = FlowCoordinator::new(catalog(), MockSubmitter::ok());
    assert!(!flow.can_proceed());
    assert_eq!(flow.advance().await, Err(CoreError::MissingPrimary));
    assert_eq!(flow.step(), FlowStep::PrimaryEmotion);

    flow.select_curriculum(1).await.unwrap();
    assert!(flow.can_proceed());
    assert_eq!(flow.advance().await.unwrap(), FlowStep::SecondaryEmotion);
}

#[tokio::test]
async fn test_duplicate_secondary_rejected_without_state_change() {
    let flow = FlowCoordinator::new(catalog(), MockSubmitter::ok());
    flow.select_curriculum(1).await.unwrap();
    flow.advance().await.unwrap();

    let before = flow.snapshot();
    assert_eq!(flow.select_curriculum(1).await, Err(CoreError::DuplicateSecondary(1)));
    assert_eq!(flow.snapshot(), before);

    flow.select_curriculum(3).await.unwrap();
    assert_eq!(flow.snapshot().selection.secondary_curriculum_id, Some(3));
}

#[tokio::test]
async fn test_skipping_optional_steps() {
    let flow = FlowCoordinator::new(catalog(), MockSubmitter::ok());
    flow.select_curriculum(2).await.unwrap();
    // Secondary and strategy can both be skipped outright.
    assert_eq!(flow.advance().await.unwrap(), FlowStep::SecondaryEmotion);
    assert_eq!(flow.advance().await.unwrap(), FlowStep::StrategySelection);
    assert_eq!(flow.advance().await.unwrap(), FlowStep::Review);

    let selection = flow.snapshot().selection;
    assert_eq!(selection.secondary_curriculum_id, None);
    assert_eq!(selection.strategy_id, None);
}

#[tokio::test]
async fn test_strategy_step_scopes_catalog_and_preselects_phase() {
    let flow = FlowCoordinator::new(catalog(), MockSubmitter::ok());
    // Curriculum 3 lives in the "peaking" phase of the Anger layer.
    flow.select_curriculum(3).await.unwrap();
    flow.advance().await.unwrap();
    flow.advance().await.unwrap();

    let snapshot = flow.snapshot();
    assert_eq!(snapshot.step, FlowStep::StrategySelection);
    assert_eq!(snapshot.scope, CatalogScope::StrategyLayer);
    // Matched by name against the strategy layer's "peaking" phase.
    assert_eq!(snapshot.preselected_phase_id, Some(101));

    let visible = flow.visible_layers();
    assert_eq!(visible.len(), 1);
    assert!(visible[0].is_strategy_layer());
}

#[tokio::test]
async fn test_select_strategy_only_during_strategy_step() {
    let flow = FlowCoordinator::new(catalog(), MockSubmitter::ok());
    assert_eq!(
        flow.select_strategy(10).await,
        Err(CoreError::InvalidTransition(FlowStep::PrimaryEmotion))
    );

    flow.select_curriculum(1).await.unwrap();
    flow.advance().await.unwrap();
    flow.advance().await.unwrap();
    flow.select_strategy(10).await.unwrap();
    assert_eq!(flow.snapshot().selection.strategy_id, Some(10));

    flow.clear_strategy().await;
    assert_eq!(flow.snapshot().selection.strategy_id, None);
}

#[tokio::test]
async fn test_getters_resolve_against_catalog() {
    let flow = FlowCoordinator::new(catalog(), MockSubmitter::ok());
    flow.select_curriculum(2).await.unwrap();
    assert_eq!(flow.primary_curriculum().map(|e| e.dosage), Some(Dosage::Toxic));

    // A stale id resolves to "not found", never an error.
    flow.reset().await;
    flow.select_curriculum(999).await.unwrap();
    assert!(flow.primary_curriculum().is_none());
    assert!(flow.secondary_curriculum().is_none());
    assert!(flow.strategy().is_none());
}

#[tokio::test]
async fn test_submit_without_primary_never_calls_collaborator() {
    let submitter = MockSubmitter::ok();
    let flow = FlowCoordinator::new(catalog(), submitter.clone());

    let result = flow.submit().await;
    assert_eq!(result, Err(CoreError::MissingPrimary));
    assert_eq!(submitter.call_count(), 0);
}

#[tokio::test]
async fn test_submit_only_from_review() {
    let submitter = MockSubmitter::ok();
    let flow = FlowCoordinator::new(catalog(), submitter.clone());
    flow.select_curriculum(1).await.unwrap();

    let result = flow.submit().await;
    assert_eq!(result, Err(CoreError::InvalidTransition(FlowStep::PrimaryEmotion)));
    assert_eq!(submitter.call_count(), 0);
}

#[tokio::test]
async fn test_submit_success_resets_and_records_to_cache() {
    let cache = Arc::new(SessionCache::utc());
    cache
        .install_catalog(Catalog { phase_order: vec![], layers: vec![] })
        .await;
    cache.install_entries(vec![]).await;

    let flow = FlowCoordinator::new(catalog(), MockSubmitter::ok()).with_cache(cache.clone());
    flow_at_review(&flow).await;
    flow.select_curriculum(1).await.err(); // no-op at review

    let entry = flow.submit().await.unwrap();
    assert_eq!(entry.curriculum_id, 1);

    let snapshot = flow.snapshot();
    assert_eq!(snapshot.step, FlowStep::PrimaryEmotion);
    assert_eq!(snapshot.selection, FlowSelection::default());

    let cached = cache.snapshot().await.unwrap();
    assert_eq!(cached.entries.len(), 1);
    assert_eq!(cached.entries[0].id, 99);
}

#[tokio::test]
async fn test_submit_failure_keeps_review_for_explicit_retry() {
    let submitter = MockSubmitter::failing();
    let flow = FlowCoordinator::new(catalog(), submitter.clone());
    flow_at_review(&flow).await;

    let result = flow.submit().await;
    assert!(matches!(result, Err(CoreError::Transport(_))));

    let snapshot = flow.snapshot();
    assert_eq!(snapshot.step, FlowStep::Review);
    assert_eq!(snapshot.selection.primary_curriculum_id, Some(1));
    assert!(snapshot.submit_error.is_some());
    assert_eq!(submitter.call_count(), 1);

    // The entry is only resubmitted when the user explicitly retries.
    let _ = flow.submit().await;
    assert_eq!(submitter.call_count(), 2);
}

#[tokio::test]
async fn test_overlapping_submits_reach_collaborator_once() {
    let gate = Arc::new(Notify::new());
    let submitter = MockSubmitter::gated(gate.clone());
    let flow = Arc::new(FlowCoordinator::new(catalog(), submitter.clone()));
    flow_at_review(&flow).await;

    let first = tokio::spawn({
        let flow = flow.clone();
        async move { flow.submit().await }
    });
    // Let the first submission reach the collaborator and park there.
    while submitter.call_count() == 0 {
        tokio::task::yield_now().await;
    }

    // A second submit while one is pending is rejected up front.
    assert_eq!(flow.submit().await, Err(CoreError::SubmissionInFlight));
    assert_eq!(submitter.call_count(), 1);

    gate.notify_one();
    let entry = first.await.unwrap().unwrap();
    assert_eq!(entry.curriculum_id, 1);
    assert_eq!(flow.step(), FlowStep::PrimaryEmotion);
}

#[tokio::test]
async fn test_cancel_during_submission_applies_no_mutation() {
    let gate = Arc::new(Notify::new());
    let submitter = MockSubmitter::gated(gate.clone());
    let flow = Arc::new(FlowCoordinator::new(catalog(), submitter.clone()));
    flow_at_review(&flow).await;

    let task = tokio::spawn({
        let flow = flow.clone();
        async move { flow.submit().await }
    });
    // Let the submission reach the collaborator, then dismiss the flow.
    tokio::task::yield_now().await;
    while submitter.call_count() == 0 {
        tokio::task::yield_now().await;
    }
    flow.cancel().await;
    let after_cancel = flow.snapshot();

    gate.notify_one();
    let outcome = task.await.unwrap();
    assert_eq!(outcome, Err(CoreError::SubmissionCancelled));
    // The late outcome published nothing.
    assert_eq!(flow.snapshot(), after_cancel);
    assert_eq!(after_cancel.step, FlowStep::PrimaryEmotion);
    assert_eq!(after_cancel.selection, FlowSelection::default());
}

#[tokio::test]
async fn test_edit_back_preserves_selections() {
    let flow = FlowCoordinator::new(catalog(), MockSubmitter::ok());
    flow.select_curriculum(1).await.unwrap();
    flow.advance().await.unwrap();
    flow.select_curriculum(3).await.unwrap();
    flow.advance().await.unwrap();
    flow.select_strategy(10).await.unwrap();
    flow.advance().await.unwrap();

    flow.edit_back().await.unwrap();

    let snapshot = flow.snapshot();
    assert_eq!(snapshot.step, FlowStep::PrimaryEmotion);
    assert_eq!(snapshot.scope, CatalogScope::EmotionLayers);
    assert_eq!(snapshot.selection.primary_curriculum_id, Some(1));
    assert_eq!(snapshot.selection.secondary_curriculum_id, Some(3));
    assert_eq!(snapshot.selection.strategy_id, Some(10));

    // Re-picking the secondary as the new primary keeps them distinct.
    flow.select_curriculum(3).await.unwrap();
    assert_eq!(flow.snapshot().selection.secondary_curriculum_id, None);
}
