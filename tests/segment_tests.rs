mod common;

use common::*;
use octofhir_hl7v2::*;

#[test]
fn test_segment_field_slots() {
    let mut message = create_test_message("ADT_A01");
    let root = message.root();
    let pid = message.get(root, "PID").unwrap();
    let segment = message.segment(pid).unwrap();

    assert_eq!(segment.num_fields(), 7);
    let identifiers = segment.item(3).unwrap();
    assert_eq!(identifiers.type_name(), "CE");
    assert!(identifiers.is_required());
    assert!(identifiers.is_unbounded());
    assert_eq!(identifiers.length(), 250);

    let set_id = segment.item(1).unwrap();
    assert_eq!(set_id.max_reps(), 1);
    assert_eq!(set_id.description(), Some("Set ID - PID"));
    assert!(segment.fields(1).unwrap().is_empty());
}

#[test]
fn test_field_descriptions_are_mutable() {
    let mut message = create_test_message("ADT_A01");
    let root = message.root();
    let pv1 = message.get(root, "PV1").unwrap();
    let segment = message.segment_mut(pv1).unwrap();

    assert_eq!(segment.item(1).unwrap().description(), None);
    segment
        .item_mut(1)
        .unwrap()
        .set_description(Some("Set ID - PV1".to_string()));
    assert_eq!(segment.item(1).unwrap().description(), Some("Set ID - PV1"));
}

#[test]
fn test_field_repetitions_fetch_or_create() {
    let mut message = create_test_message("ADT_A01");
    let root = message.root();
    let pid = message.get(root, "PID").unwrap();
    let segment = message.segment_mut(pid).unwrap();

    segment.field_mut(5, 0).unwrap().set_first_value(Some("DOE")).unwrap();
    segment.field_mut(5, 1).unwrap().set_first_value(Some("ROE")).unwrap();
    assert_eq!(segment.fields(5).unwrap().len(), 2);
    assert_eq!(
        segment.field(5, 1).unwrap().and_then(Type::first_value),
        Some("ROE")
    );
    assert!(segment.field(5, 2).unwrap().is_none());

    assert!(matches!(
        segment.field_mut(5, 4),
        Err(Hl7Error::RepetitionGap { available: 2, .. })
    ));

    segment.field_mut(1, 0).unwrap();
    assert!(matches!(
        segment.field_mut(1, 1),
        Err(Hl7Error::NonRepeatingViolation { .. })
    ));
}

#[test]
fn test_unknown_field_number_is_an_error() {
    let mut message = create_test_message("ADT_A01");
    let root = message.root();
    let pv1 = message.get(root, "PV1").unwrap();
    let segment = message.segment_mut(pv1).unwrap();

    assert!(segment.item(0).is_err());
    assert!(segment.item(2).is_err());
    assert!(matches!(
        segment.field_mut(2, 0),
        Err(Hl7Error::ApplicationInternal { .. })
    ));
}

#[test]
fn test_coded_field_keeps_table() {
    let mut message = create_test_message("ORU_R01");
    let root = message.root();
    let result = message.get(root, "PATIENT_RESULT").unwrap();
    let order = message.get(result, "ORDER_OBSERVATION").unwrap();
    let observation = message.get(order, "OBSERVATION").unwrap();
    let obx = message.get(observation, "OBX").unwrap();

    let value_type = message.segment_mut(obx).unwrap().field_mut(2, 0).unwrap();
    assert_eq!(value_type.type_name(), "ID");
    assert_eq!(value_type.as_primitive().unwrap().table(), Some(125));
}

#[test]
fn test_declared_composite_components() {
    let mut message = create_test_message("ADT_A01");
    let root = message.root();
    let pid = message.get(root, "PID").unwrap();
    let identifier = message.segment_mut(pid).unwrap().field_mut(3, 0).unwrap();

    let composite = identifier.as_composite_mut().unwrap();
    assert_eq!(composite.type_name(), "CE");
    assert_eq!(composite.len(), 6);
    composite
        .component_mut(1)
        .unwrap()
        .set_first_value(Some("Glucose"))
        .unwrap();
    assert_eq!(
        composite.component(1).and_then(Type::first_value),
        Some("Glucose")
    );
    assert!(matches!(
        composite.component_mut(6),
        Err(Hl7Error::DataType { .. })
    ));
}

#[test]
fn test_failing_constructor_is_an_instantiation_error() {
    let mut message = create_empty_message(Some(VERSION));
    let root = message.root();
    let before = message.structure_count();

    let result = message.extend_with_unplanned_segment(root, "ZBD");
    match result {
        Err(Hl7Error::Instantiation { type_name, source }) => {
            assert_eq!(type_name, "ZBD");
            assert!(matches!(*source, Hl7Error::DataType { .. }));
        }
        other => panic!("expected instantiation error, got {other:?}"),
    }
    assert!(message.names(root).unwrap().is_empty());
    assert_eq!(message.structure_count(), before);
}

#[test]
fn test_kind_without_constructor_cannot_be_instantiated() {
    let mut message = create_empty_message(Some(VERSION));
    let root = message.root();

    let result = message.extend_with_unplanned_segment(root, "ZNC");
    match result {
        Err(Hl7Error::Instantiation { type_name, source }) => {
            assert_eq!(type_name, "ZNC");
            assert!(source.to_string().contains("has no constructor"));
        }
        other => panic!("expected instantiation error, got {other:?}"),
    }
}

#[test]
fn test_default_constructor_fallback() {
    let mut message = create_empty_message(Some(VERSION));
    let root = message.root();

    let name = message.extend_with_unplanned_segment(root, "ZDF").unwrap();
    let zdf = message.get(root, &name).unwrap();
    let segment = message.segment(zdf).unwrap();
    assert_eq!(segment.name(), "ZDF");
    assert!(!segment.is_generic());
    assert_eq!(
        segment.item(1).unwrap().description(),
        Some("Default Constructed")
    );
}

#[test]
fn test_lenient_declarations_skip_bad_fields() {
    let mut message = create_empty_message(Some(VERSION));
    let root = message.root();

    let name = message.extend_with_unplanned_segment(root, "ZLN").unwrap();
    let zln = message.get(root, &name).unwrap();
    assert_eq!(message.segment(zln).unwrap().num_fields(), 1);
}

#[test]
fn test_strict_declarations_fail_construction() {
    let mut registry = create_test_registry();
    let zln = registry.segment(VERSION, "ZLN").unwrap();
    registry.register_message(
        VERSION,
        StructureKind::group("ZLN_Z01", vec![ChildDecl::new(zln, true, false)]),
    );
    let factory: std::sync::Arc<dyn ModelClassFactory> = std::sync::Arc::new(registry);

    let config = ModelConfig::default().with_lenient_declarations(false);
    let mut message =
        Message::from_registry("ZLN_Z01", VERSION, factory, config).unwrap();
    let root = message.root();
    let before = message.structure_count();

    assert!(matches!(
        message.get(root, "ZLN"),
        Err(Hl7Error::Instantiation { .. })
    ));
    assert_eq!(message.current_reps(root, "ZLN").unwrap(), 0);
    assert_eq!(message.structure_count(), before);
}

#[test]
fn test_strict_test_messages_still_build() {
    let message = create_strict_message("ORU_R01").unwrap();
    assert_eq!(message.names(message.root()).unwrap().len(), 2);
}

#[test]
fn test_constructor_building_wrong_body_fails() {
    let mut registry = create_test_registry();
    let nte = registry.segment(VERSION, "NTE").unwrap();
    registry.register_segment(
        VERSION,
        StructureKind::new("ZWB", StructureCategory::Segment).with_default_constructor(
            move |scope: &mut StructureScope<'_>| {
                scope
                    .declare(std::sync::Arc::clone(&nte), false, false)
                    .map(|_| ())
            },
        ),
    );
    let mut message = Message::new("TEST_MSG", Some(VERSION), std::sync::Arc::new(registry));
    let root = message.root();

    match message.extend_with_unplanned_segment(root, "ZWB") {
        Err(Hl7Error::Instantiation { type_name, source }) => {
            assert_eq!(type_name, "ZWB");
            assert!(matches!(*source, Hl7Error::ApplicationInternal { .. }));
        }
        other => panic!("expected instantiation error, got {other:?}"),
    }
}
