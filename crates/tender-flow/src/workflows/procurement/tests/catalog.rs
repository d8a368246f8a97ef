use crate::workflows::procurement::catalog::{StageCatalog, FIRST_STAGE, LAST_STAGE};
use crate::workflows::procurement::domain::StageCategory;
use crate::workflows::procurement::engine::WorkflowError;

#[test]
fn category_spans_partition_the_pipeline() {
    let mut expected_start = FIRST_STAGE;
    for category in StageCategory::ordered() {
        let (first, last) = category.stage_span();
        assert_eq!(
            first, expected_start,
            "{} must start where the previous category ended",
            category.label()
        );
        assert!(first <= last);
        expected_start = last + 1;
    }
    assert_eq!(expected_start, LAST_STAGE + 1);
}

#[test]
fn every_stage_maps_to_exactly_one_category() {
    let catalog = StageCatalog::standard();
    for number in FIRST_STAGE..=LAST_STAGE {
        let category = catalog.category_of(number).expect("stage within catalog");
        let owners = StageCategory::ordered()
            .into_iter()
            .filter(|candidate| {
                let (first, last) = candidate.stage_span();
                (first..=last).contains(&number)
            })
            .count();
        assert_eq!(owners, 1, "stage {number} must belong to one span");
        let (first, last) = category.stage_span();
        assert!((first..=last).contains(&number));
    }
}

#[test]
fn catalog_lists_every_stage_in_order_with_consistent_categories() {
    let catalog = StageCatalog::standard();
    let definitions = catalog.definitions();
    assert_eq!(definitions.len(), LAST_STAGE as usize);

    for (index, definition) in definitions.iter().enumerate() {
        assert_eq!(definition.number, index as u8 + 1);
        assert_eq!(
            definition.category,
            catalog
                .category_of(definition.number)
                .expect("stage within catalog"),
        );
        assert!(definition.typical_duration_days > 0.0);
        assert!(definition.automation_level <= 100);
    }
}

#[test]
fn lookups_outside_the_catalog_are_rejected() {
    let catalog = StageCatalog::standard();
    for number in [0, LAST_STAGE + 1, u8::MAX] {
        assert_eq!(
            catalog.category_of(number),
            Err(WorkflowError::UnknownStage(number))
        );
        assert!(matches!(
            catalog.definition(number),
            Err(WorkflowError::UnknownStage(_))
        ));
    }
}

#[test]
fn stages_in_returns_the_category_members() {
    let catalog = StageCatalog::standard();
    let customs = catalog.stages_in(StageCategory::Customs);
    assert_eq!(customs.len(), 7);
    assert!(customs
        .iter()
        .all(|stage| (21..=27).contains(&stage.number)));
}
