use scalarize_api::{BuildError, CompileError, IrObject, Stage};
use scalarize_core::program::load_object;
use scalarize_core::{Program, ProgramOptions, RegionLayout};
use serde_json::json;
use std::collections::HashMap;

fn object(value: serde_json::Value) -> IrObject {
    serde_json::from_value(value).unwrap()
}

/// Passes the attribute through to a varying, scaled by a uniform.
fn vertex_object() -> IrObject {
    object(json!({
        "symbols": {
            "uniform": [{ "name": "scale", "type": "float", "out": "uniform@0" }],
            "attribute": [{ "name": "position", "type": "vec4", "out": "attribute@0" }],
            "varying": [{ "name": "v_pos", "type": "vec4", "out": "varying@0" }]
        },
        "code": [
            { "comment": "v_pos = position * scale;" },
            { "op": "MUL",
              "d": { "name": "varying", "address": 0 },
              "s1": { "name": "attribute", "address": 0 },
              "s2": { "name": "uniform", "address": 0, "swizzle": "x" } }
        ]
    }))
}

/// Writes the varying to the result, with a conditional override of w.
fn fragment_object() -> IrObject {
    object(json!({
        "symbols": {
            "uniform": [{ "name": "color", "type": "vec4", "out": "uniform@8" }],
            "varying": [{ "name": "v_pos", "type": "vec4", "out": "varying@0" }]
        },
        "code": [
            { "op": "ADD",
              "d": { "name": "result", "address": 0 },
              "s1": { "name": "varying", "address": 0 },
              "s2": { "name": "uniform", "address": 2 } },
            { "op": "SLT",
              "d": { "name": "temp", "address": 0, "swizzle": "x" },
              "s1": { "name": "result", "address": 0, "swizzle": "x" },
              "s2": { "raw": "0.0" } },
            { "op": "IF", "s1": { "name": "temp", "address": 0, "swizzle": "x" } },
            { "op": "MOV", "d": { "name": "result", "address": 0, "swizzle": "w" }, "s1": { "raw": "-1.0" } },
            { "op": "ELSE" },
            { "op": "MOV", "d": { "name": "result", "address": 0, "swizzle": "w" }, "s1": { "raw": "1.0" } },
            { "op": "ENDIF" }
        ]
    }))
}

#[test]
fn test_layout_merge_exposes_locations() {
    let mut program = Program::new();
    program
        .add_object_code(&fragment_object(), Stage::Fragment)
        .unwrap();

    assert_eq!(program.uniform_location("color"), Some(8));
    assert_eq!(program.uniform_size("color"), Some(4));
    assert_eq!(program.varying_location("v_pos"), Some(0));
    assert_eq!(program.uniform_location("missing"), None);
    assert_eq!(program.attribute_size("color"), None);
}

#[test]
fn test_unknown_opcode_rejects_object() {
    let mut program = Program::new();
    program
        .add_object_code(&vertex_object(), Stage::Vertex)
        .unwrap();
    let accepted = program.stage_code(Stage::Vertex).to_vec();

    let bad = object(json!({
        "symbols": { "uniform": [{ "name": "late", "type": "vec2", "out": "uniform@16" }] },
        "code": [
            { "op": "MOV", "d": { "name": "temp", "address": 0 }, "s1": { "name": "temp", "address": 1 } },
            { "op": "NRM", "d": { "name": "temp", "address": 0 }, "s1": { "name": "temp", "address": 0 } }
        ]
    }));

    let err = program.add_object_code(&bad, Stage::Vertex).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownOpcode {
            opcode: "NRM".into()
        }
    );
    assert_eq!(program.last_error(), Some(&err));
    assert_eq!(program.stage_code(Stage::Vertex), accepted.as_slice());
    assert_eq!(program.uniform_location("late"), None);

    let mut fresh = Program::new();
    assert!(fresh.add_object_code(&bad, Stage::Fragment).is_err());
    assert!(fresh.stage_code(Stage::Fragment).is_empty());

    program.clear_error();
    assert!(program.last_error().is_none());
}

#[test]
fn test_oversized_address_rejects_object() {
    let address = usize::MAX / 4 + 1;
    let bad = object(json!({
        "code": [{ "op": "MOV", "d": { "name": "temp", "address": address }, "s1": { "raw": "1.0" } }]
    }));

    let mut program = Program::new();
    let err = program.add_object_code(&bad, Stage::Vertex).unwrap_err();
    assert_eq!(
        err,
        CompileError::AddressOverflow {
            name: "temp".into(),
            address
        }
    );
    assert_eq!(program.last_error(), Some(&err));
    assert!(program.stage_code(Stage::Vertex).is_empty());
}

#[test]
fn test_accepted_object_clears_last_error() {
    let mut program = Program::new();
    let bad = object(json!({ "code": [{ "op": "mov", "d": { "name": "temp", "address": 0 } }] }));
    assert_eq!(
        program.add_object_code(&bad, Stage::Vertex),
        Err(CompileError::UnknownOpcode {
            opcode: "mov".into()
        })
    );
    assert!(program.last_error().is_some());

    program
        .add_object_code(&vertex_object(), Stage::Vertex)
        .unwrap();
    assert!(program.last_error().is_none());
}

#[test]
fn test_objects_append_to_their_stage() {
    let mut program = Program::new();
    program
        .add_object_code(&vertex_object(), Stage::Vertex)
        .unwrap();
    let first = program.stage_code(Stage::Vertex).len();
    program
        .add_object_code(&vertex_object(), Stage::Vertex)
        .unwrap();

    assert_eq!(program.stage_code(Stage::Vertex).len(), first * 2);
    assert!(program.stage_code(Stage::Fragment).is_empty());
    assert!(program.render(Stage::Vertex).contains("varying_f32[3] = attribute_f32[3] * uniform_f32[0];"));
}

#[test]
fn test_run_both_stages() {
    let mut program = Program::new();
    program
        .add_object_code(&vertex_object(), Stage::Vertex)
        .unwrap();
    program
        .add_object_code(&fragment_object(), Stage::Fragment)
        .unwrap();

    assert_eq!(program.vertex(), Err(BuildError::NotBuilt));
    program.build().unwrap();

    program.set_attribute_data("position", &[1.0, 2.0, 3.0, 4.0]);
    program.set_uniform_data("scale", &[2.0]);
    program.set_uniform_data("color", &[0.5, 0.5, 0.5, 0.0]);
    program.set_uniform_data("not_declared", &[9.0]);

    program.vertex().unwrap();
    assert_eq!(program.varying_data(0, 4), vec![2.0, 4.0, 6.0, 8.0]);

    program.fragment().unwrap();
    assert_eq!(program.result_data(0, 4), vec![2.5, 4.5, 6.5, 1.0]);

    program.set_uniform_data("color", &[-10.0, 0.0, 0.0, 0.0]);
    program.fragment().unwrap();
    assert_eq!(program.result_data(0, 4), vec![-8.0, 4.0, 6.0, -1.0]);
}

#[test]
fn test_uniform_data_is_limited_to_declared_size() {
    let mut program = Program::new();
    program
        .add_object_code(&vertex_object(), Stage::Vertex)
        .unwrap();
    program.set_uniform_data("scale", &[3.0, 7.0, 7.0]);
    assert_eq!(
        program.buffer().read(scalarize_api::Region::Uniform, 0, 2),
        vec![3.0, 0.0]
    );
}

#[test]
fn test_texture_sampler_is_injected() {
    let frag = object(json!({
        "code": [
            { "op": "TEX",
              "d": { "name": "result", "address": 1 },
              "s1": { "name": "varying", "address": 0, "swizzle": "xy" },
              "s2": { "raw": "0" } }
        ]
    }));

    let mut program = Program::new();
    program.add_object_code(&frag, Stage::Fragment).unwrap();
    program.build().unwrap();
    program.set_tex_function(|u, v, _lod| [u, v, u + v, 1.0]);

    program.fragment().unwrap();
    assert_eq!(program.result_data(4, 4), vec![0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_overlapping_operands_use_scratch() {
    // temp[0].xyz = temp[0].zxy, read back through result.
    let code = object(json!({
        "code": [
            { "op": "MOV", "d": { "name": "temp", "address": 0 }, "s1": { "raw": "1.0" } },
            { "op": "MOV", "d": { "name": "temp", "address": 0, "swizzle": "y" }, "s1": { "raw": "2.0" } },
            { "op": "MOV", "d": { "name": "temp", "address": 0, "swizzle": "z" }, "s1": { "raw": "3.0" } },
            { "op": "MOV",
              "d": { "name": "temp", "address": 0, "swizzle": "xyz" },
              "s1": { "name": "temp", "address": 0, "swizzle": "zxy" } },
            { "op": "MOV", "d": { "name": "result", "address": 0 }, "s1": { "name": "temp", "address": 0 } }
        ]
    }));

    let mut program = Program::new();
    program.add_object_code(&code, Stage::Vertex).unwrap();
    program.build().unwrap();
    program.vertex().unwrap();
    assert_eq!(program.result_data(0, 3), vec![3.0, 1.0, 2.0]);
}

#[test]
fn test_build_rejects_unknown_storage() {
    let code = object(json!({
        "code": [{ "op": "MOV", "d": { "name": "dest", "address": 0 }, "s1": { "name": "src", "address": 1 } }]
    }));
    let mut program = Program::new();
    program.add_object_code(&code, Stage::Vertex).unwrap();
    assert_eq!(
        program.build(),
        Err(BuildError::UnknownRegion {
            name: "dest_f32".into()
        })
    );
    assert!(!program.is_built());
}

#[test]
fn test_custom_layout_and_type_table() {
    let options = ProgramOptions {
        layout: RegionLayout {
            result: 4,
            ..RegionLayout::default()
        },
        trace_comments: false,
    };
    let mut program = Program::with_options(options)
        .with_type_sizes(HashMap::from([("Light".to_string(), 8)]));

    let obj = object(json!({
        "symbols": { "uniform": [{ "name": "light", "type": "Light", "out": "uniform@4" }] },
        "code": [{ "op": "MOV", "d": { "name": "result", "address": 1 }, "s1": { "raw": "1.0" } }]
    }));
    program.add_object_code(&obj, Stage::Fragment).unwrap();
    assert_eq!(program.uniform_size("light"), Some(8));
    assert!(!program.render(Stage::Fragment).contains("//"));
    assert!(matches!(
        program.build(),
        Err(BuildError::OutOfBounds { index: 4, capacity: 4, .. })
    ));
}

#[test]
fn test_load_object_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vs.json");
    std::fs::write(&path, serde_json::to_string(&vertex_object()).unwrap()).unwrap();

    let loaded = load_object(&path).unwrap();
    assert_eq!(loaded, vertex_object());
}
