use octofhir_hl7v2::*;
use std::sync::Arc;

#[allow(dead_code)]
pub const VERSION: &str = "2.5";

fn field(registry: &SchemaRegistry, code: &str, required: bool, max_reps: i32, length: u32) -> FieldDecl {
    let datatype = registry
        .datatype(VERSION, code)
        .unwrap_or_else(|| panic!("missing builtin datatype {code}"));
    FieldDecl::new(datatype, required, max_reps, length)
}

/// Builtin datatypes plus a small ADT/ORU schema for version 2.5.
#[allow(dead_code)]
pub fn create_test_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::with_builtin_datatypes();

    let msh = registry.register_segment(
        VERSION,
        StructureKind::segment(
            "MSH",
            vec![
                field(&registry, "ST", true, 1, 1).with_description("Field Separator"),
                field(&registry, "ST", true, 1, 4).with_description("Encoding Characters"),
                field(&registry, "HD", false, 1, 227).with_description("Sending Application"),
            ],
        ),
    );
    let evn = registry.register_segment(
        VERSION,
        StructureKind::segment(
            "EVN",
            vec![
                field(&registry, "ID", false, 1, 3).with_args(vec![ConstructorArg::Table(3)]),
                field(&registry, "TS", true, 1, 26).with_description("Recorded Date/Time"),
            ],
        ),
    );
    let pid = registry.register_segment(
        VERSION,
        StructureKind::segment(
            "PID",
            vec![
                field(&registry, "SI", false, 1, 4).with_description("Set ID - PID"),
                field(&registry, "ST", false, 1, 20),
                field(&registry, "CE", true, 0, 250).with_description("Patient Identifier List"),
                field(&registry, "ST", false, 0, 20),
                field(&registry, "ST", true, 0, 250).with_description("Patient Name"),
                field(&registry, "ST", false, 0, 250),
                field(&registry, "TS", false, 1, 26).with_description("Date/Time of Birth"),
            ],
        ),
    );
    let nk1 = registry.register_segment(
        VERSION,
        StructureKind::segment("NK1", vec![field(&registry, "SI", true, 1, 4)]),
    );
    let pv1 = registry.register_segment(
        VERSION,
        StructureKind::segment("PV1", vec![field(&registry, "SI", false, 1, 4)]),
    );
    let nte = registry.register_segment(
        VERSION,
        StructureKind::segment(
            "NTE",
            vec![
                field(&registry, "SI", false, 1, 4),
                field(&registry, "ID", false, 1, 8).with_args(vec![ConstructorArg::Table(105)]),
                field(&registry, "FT", false, 0, 65536).with_description("Comment"),
            ],
        ),
    );
    let obr = registry.register_segment(
        VERSION,
        StructureKind::segment("OBR", vec![field(&registry, "SI", false, 1, 4)]),
    );
    let varies = registry
        .datatype(VERSION, "Varies")
        .expect("builtin Varies datatype");
    let obx = registry.register_segment(
        VERSION,
        StructureKind::segment(
            "OBX",
            vec![
                field(&registry, "SI", false, 1, 4),
                field(&registry, "ID", false, 1, 2)
                    .with_args(vec![ConstructorArg::Table(125)])
                    .with_description("Value Type"),
                field(&registry, "CE", true, 1, 250).with_description("Observation Identifier"),
                field(&registry, "ST", false, 1, 20),
                FieldDecl::new(varies, false, -1, 99999).with_description("Observation Value"),
            ],
        ),
    );

    let observation = registry.register_group(
        VERSION,
        StructureKind::group(
            "ORU_R01_OBSERVATION",
            vec![
                ChildDecl::new(Arc::clone(&obx), false, false),
                ChildDecl::new(Arc::clone(&nte), false, true),
            ],
        ),
    );
    let order = registry.register_group(
        VERSION,
        StructureKind::group(
            "ORU_R01_ORDER_OBSERVATION",
            vec![
                ChildDecl::new(Arc::clone(&obr), true, false),
                ChildDecl::new(observation, false, true),
            ],
        ),
    );
    let patient = registry.register_group(
        VERSION,
        StructureKind::group(
            "ORU_R01_PATIENT",
            vec![
                ChildDecl::new(Arc::clone(&pid), true, false),
                ChildDecl::new(Arc::clone(&nk1), false, true),
            ],
        ),
    );
    let patient_result = registry.register_group(
        VERSION,
        StructureKind::group(
            "ORU_R01_PATIENT_RESULT",
            vec![
                ChildDecl::new(patient, false, false),
                ChildDecl::new(order, true, true),
            ],
        ),
    );
    registry.register_message(
        VERSION,
        StructureKind::group(
            "ORU_R01",
            vec![
                ChildDecl::new(Arc::clone(&msh), true, false),
                ChildDecl::new(patient_result, true, true),
            ],
        ),
    );
    registry.register_message(
        VERSION,
        StructureKind::group(
            "ADT_A01",
            vec![
                ChildDecl::new(msh, true, false),
                ChildDecl::new(evn, true, false),
                ChildDecl::new(pid, true, false),
                ChildDecl::new(nk1, false, true),
                ChildDecl::new(pv1, true, false),
                ChildDecl::new(Arc::clone(&nte), false, true),
                ChildDecl::new(nte, false, false),
            ],
        ),
    );

    register_misbehaving_segments(&mut registry);
    registry
}

/// Segments exercising the instantiation fallbacks and declaration leniency.
fn register_misbehaving_segments(registry: &mut SchemaRegistry) {
    registry.register_segment(
        VERSION,
        StructureKind::new("ZBD", StructureCategory::Segment).with_factory_constructor(
            |_scope: &mut StructureScope<'_>, _factory: &dyn ModelClassFactory| {
                Err(Hl7Error::data_type("ZBD refuses to be built"))
            },
        ),
    );
    registry.register_segment(
        VERSION,
        StructureKind::new("ZNC", StructureCategory::Segment),
    );
    let st = registry
        .datatype(VERSION, "ST")
        .expect("builtin ST datatype");
    let default_field = st.clone();
    registry.register_segment(
        VERSION,
        StructureKind::new("ZDF", StructureCategory::Segment).with_default_constructor(
            move |scope: &mut StructureScope<'_>| {
                scope.add_field(
                    FieldDecl::new(default_field.clone(), false, 1, 20)
                        .with_description("Default Constructed"),
                )
            },
        ),
    );
    // ST takes no table argument, so the first declaration fails.
    registry.register_segment(
        VERSION,
        StructureKind::segment(
            "ZLN",
            vec![
                FieldDecl::new(st.clone(), false, 1, 20).with_args(vec![ConstructorArg::Table(1)]),
                FieldDecl::new(st, false, 1, 20),
            ],
        ),
    );
}

#[allow(dead_code)]
pub fn create_test_factory() -> Arc<dyn ModelClassFactory> {
    Arc::new(create_test_registry())
}

#[allow(dead_code)]
pub fn create_test_message(name: &str) -> Message {
    Message::from_registry(name, VERSION, create_test_factory(), ModelConfig::default())
        .expect("registered test message")
}

/// Versioned message with no declared slots.
#[allow(dead_code)]
pub fn create_empty_message(version: Option<&str>) -> Message {
    Message::new("TEST_MSG", version, create_test_factory())
}

#[allow(dead_code)]
pub fn create_strict_message(name: &str) -> Result<Message> {
    Message::from_registry(
        name,
        VERSION,
        create_test_factory(),
        ModelConfig::default().with_lenient_declarations(false),
    )
}
