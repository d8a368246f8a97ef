use super::common::fixed_now;
use crate::workflows::procurement::domain::{
    Project, ProjectId, ProjectStatus, StageCategory, TransitionKind,
};
use crate::workflows::procurement::engine::{WorkflowEngine, WorkflowError};
use crate::workflows::procurement::store::WorkflowEventKind;

fn project() -> Project {
    Project::new(
        ProjectId("prj-test".to_string()),
        "Alexandria Switchgear".to_string(),
        "Delta Marine".to_string(),
        120_000.0,
        None,
        fixed_now(),
    )
}

#[test]
fn advance_moves_project_and_logs_a_single_record() {
    let engine = WorkflowEngine::new();
    let mut project = project();

    let notification = engine
        .advance(&mut project, 5, Some("batch correction".to_string()), fixed_now())
        .expect("advance succeeds");

    assert_eq!(project.current_stage, 5);
    assert_eq!(project.status, ProjectStatus::Active);
    assert_eq!(project.history.len(), 1);
    assert_eq!(
        project.history[0].kind,
        TransitionKind::Advanced {
            from_stage: 1,
            to_stage: 5
        }
    );
    assert_eq!(
        project.history[0].note.as_deref(),
        Some("batch correction")
    );

    match notification.event {
        WorkflowEventKind::StageAdvanced {
            from_stage,
            to_stage,
            from_category,
            to_category,
        } => {
            assert_eq!(from_stage, 1);
            assert_eq!(to_stage, 5);
            assert_eq!(from_category, StageCategory::DocumentProcessing);
            assert_eq!(to_category, StageCategory::Communication);
        }
        other => panic!("expected stage advanced event, got {other:?}"),
    }
}

#[test]
fn advance_rejects_backward_stationary_and_overflow_targets() {
    let engine = WorkflowEngine::new();
    let mut project = project();
    engine
        .advance(&mut project, 10, None, fixed_now())
        .expect("advance succeeds");

    for target in [1, 9, 10, 33] {
        let error = engine
            .advance(&mut project, target, None, fixed_now())
            .expect_err("invalid target rejected");
        assert_eq!(
            error,
            WorkflowError::InvalidTransition {
                from: 10,
                to: target
            }
        );
    }

    assert_eq!(project.current_stage, 10);
    assert_eq!(project.history.len(), 1);
}

#[test]
fn reaching_the_final_stage_does_not_complete_the_project() {
    let engine = WorkflowEngine::new();
    let mut project = project();

    engine
        .advance(&mut project, 32, None, fixed_now())
        .expect("advance succeeds");

    assert_eq!(project.current_stage, 32);
    assert_eq!(project.status, ProjectStatus::Active);
}

#[test]
fn complete_requires_the_final_stage() {
    let engine = WorkflowEngine::new();
    let mut project = project();
    engine
        .advance(&mut project, 31, None, fixed_now())
        .expect("advance succeeds");

    let error = engine
        .complete(&mut project, fixed_now())
        .expect_err("premature completion rejected");
    assert_eq!(
        error,
        WorkflowError::PrematureCompletion { current_stage: 31 }
    );
    assert_eq!(project.status, ProjectStatus::Active);
}

#[test]
fn completed_projects_refuse_further_transitions() {
    let engine = WorkflowEngine::new();
    let mut project = project();
    engine
        .advance(&mut project, 32, None, fixed_now())
        .expect("advance succeeds");
    engine
        .complete(&mut project, fixed_now())
        .expect("completion succeeds");

    assert_eq!(project.status, ProjectStatus::Completed);
    assert_eq!(
        project.history.last().map(|record| &record.kind),
        Some(&TransitionKind::Completed)
    );

    let error = engine
        .advance(&mut project, 5, None, fixed_now())
        .expect_err("terminal project rejected");
    assert_eq!(
        error,
        WorkflowError::TerminalState {
            status: ProjectStatus::Completed
        }
    );

    let error = engine
        .cancel(&mut project, "late cancellation".to_string(), fixed_now())
        .expect_err("completed project cannot be cancelled");
    assert_eq!(
        error,
        WorkflowError::TerminalState {
            status: ProjectStatus::Completed
        }
    );
}

#[test]
fn cancel_records_the_reason_and_is_idempotent() {
    let engine = WorkflowEngine::new();
    let mut project = project();

    let first = engine
        .cancel(&mut project, "client withdrew tender".to_string(), fixed_now())
        .expect("cancellation succeeds");
    assert!(first.is_some());
    assert_eq!(project.status, ProjectStatus::Cancelled);
    assert_eq!(
        project.history.last().and_then(|record| record.note.as_deref()),
        Some("client withdrew tender")
    );

    let second = engine
        .cancel(&mut project, "retry".to_string(), fixed_now())
        .expect("repeat cancellation is a no-op");
    assert!(second.is_none());
    assert_eq!(project.history.len(), 1);
}

#[test]
fn hold_freezes_advances_until_resumed() {
    let engine = WorkflowEngine::new();
    let mut project = project();

    engine
        .hold(&mut project, Some("awaiting client budget".to_string()), fixed_now())
        .expect("hold succeeds");
    assert_eq!(project.status, ProjectStatus::OnHold);

    let error = engine
        .advance(&mut project, 2, None, fixed_now())
        .expect_err("held project rejects advances");
    assert_eq!(
        error,
        WorkflowError::TerminalState {
            status: ProjectStatus::OnHold
        }
    );

    assert!(engine
        .hold(&mut project, None, fixed_now())
        .expect("repeat hold is a no-op")
        .is_none());

    engine
        .resume(&mut project, fixed_now())
        .expect("resume succeeds");
    assert_eq!(project.status, ProjectStatus::Active);
    assert!(engine
        .resume(&mut project, fixed_now())
        .expect("repeat resume is a no-op")
        .is_none());

    engine
        .advance(&mut project, 2, None, fixed_now())
        .expect("advance succeeds after resume");
    assert_eq!(project.current_stage, 2);
}

#[test]
fn cancel_is_allowed_from_hold() {
    let engine = WorkflowEngine::new();
    let mut project = project();

    engine
        .hold(&mut project, None, fixed_now())
        .expect("hold succeeds");
    engine
        .cancel(&mut project, "supplier insolvent".to_string(), fixed_now())
        .expect("cancellation succeeds from hold");
    assert_eq!(project.status, ProjectStatus::Cancelled);
}
