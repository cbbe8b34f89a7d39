use scalarize_api::{IrObject, Stage};
use scalarize_core::Program;
use serde_json::json;

const A: [f32; 4] = [0.25, -2.0, 3.0, 4.0];
const B: [f32; 4] = [2.0, 3.0, -1.5, 0.5];
const C: [f32; 4] = [1.0, -2.0, 2.0, 8.0];
const E: [f32; 4] = [4.0, 16.0, 0.25, 1.0];

/// Uniform name and the address it is declared at.
const INPUTS: [(&str, usize, [f32; 4]); 4] = [("a", 0, A), ("b", 1, B), ("c", 2, C), ("e", 3, E)];

fn address_of(name: &str) -> usize {
    INPUTS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, address, _)| *address)
        .unwrap()
}

fn declared_inputs() -> serde_json::Value {
    let uniforms: Vec<_> = INPUTS
        .iter()
        .map(|(name, address, _)| {
            json!({ "name": name, "type": "vec4", "out": format!("uniform@{}", address * 4) })
        })
        .collect();
    json!({ "uniform": uniforms })
}

/// Build `op result[0], <sources>`, feed the inputs and run the vertex stage.
fn execute(op: &str, sources: &[&str]) -> Vec<f32> {
    let mut ins = json!({ "op": op, "d": { "name": "result", "address": 0 } });
    for (slot, name) in ["s1", "s2", "s3"].iter().zip(sources) {
        ins[*slot] = json!({ "name": "uniform", "address": address_of(name) });
    }
    let obj: IrObject =
        serde_json::from_value(json!({ "symbols": declared_inputs(), "code": [ins] })).unwrap();

    let mut program = Program::new();
    program.add_object_code(&obj, Stage::Vertex).unwrap();
    program.build().unwrap();
    for (name, _, data) in INPUTS {
        program.set_uniform_data(name, &data);
    }
    program.vertex().unwrap();
    program.result_data(0, 4)
}

fn assert_close(op: &str, actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len(), "{}", op);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= 1e-6 * e.abs().max(1.0),
            "{} component {}: got {:?}, expected {:?}",
            op,
            i,
            actual,
            expected
        );
    }
}

#[test]
fn test_per_component_opcodes() {
    let cases: Vec<(&str, Vec<&str>, [f32; 4])> = vec![
        ("MOV", vec!["a"], A),
        ("ABS", vec!["a"], [0.25, 2.0, 3.0, 4.0]),
        ("ADD", vec!["a", "b"], [2.25, 1.0, 1.5, 4.5]),
        ("SUB", vec!["a", "b"], [-1.75, -5.0, 4.5, 3.5]),
        ("MUL", vec!["a", "b"], [0.5, -6.0, -4.5, 2.0]),
        ("MAD", vec!["a", "b", "c"], [1.5, -8.0, -2.5, 10.0]),
        ("MIN", vec!["a", "b"], [0.25, -2.0, -1.5, 0.5]),
        ("MAX", vec!["a", "b"], [2.0, 3.0, 3.0, 4.0]),
        ("SLT", vec!["a", "b"], [1.0, 1.0, 0.0, 0.0]),
        ("SGE", vec!["a", "b"], [0.0, 0.0, 1.0, 1.0]),
        ("SEQ", vec!["a", "c"], [0.0, 1.0, 0.0, 0.0]),
        ("SNE", vec!["a", "c"], [1.0, 0.0, 1.0, 1.0]),
        ("CMP", vec!["a", "b", "c"], [1.0, 3.0, 2.0, 8.0]),
        ("LRP", vec!["a", "b", "c"], [1.25, -12.0, -8.5, -22.0]),
        ("FLR", vec!["b"], [2.0, 3.0, -2.0, 0.0]),
        ("FRC", vec!["b"], [0.0, 0.0, 0.5, 0.5]),
        ("RCP", vec!["a"], [4.0, -0.5, 1.0 / 3.0, 0.25]),
        ("RSQ", vec!["e"], [0.5, 0.25, 2.0, 1.0]),
        ("SIN", vec!["a"], A.map(f32::sin)),
        ("COS", vec!["a"], A.map(f32::cos)),
    ];

    for (op, sources, expected) in cases {
        assert_close(op, &execute(op, &sources), &expected);
    }
}

#[test]
fn test_reduction_opcodes_broadcast() {
    let cases: Vec<(&str, Vec<&str>, f32)> = vec![
        ("DP3", vec!["a", "b"], -10.0),
        ("DP4", vec!["a", "b"], -8.0),
        ("DPH", vec!["a", "b"], -9.5),
        // Only the first component of each source counts.
        ("POW", vec!["e", "b"], 16.0),
    ];

    for (op, sources, expected) in cases {
        assert_close(op, &execute(op, &sources), &[expected; 4]);
    }
}

#[test]
fn test_in_place_dot_product() {
    let obj: IrObject = serde_json::from_value(json!({
        "symbols": declared_inputs(),
        "code": [
            { "op": "MOV", "d": { "name": "temp", "address": 0 }, "s1": { "name": "uniform", "address": 0 } },
            { "op": "DP4",
              "d": { "name": "temp", "address": 0 },
              "s1": { "name": "temp", "address": 0 },
              "s2": { "name": "temp", "address": 0 } },
            { "op": "MOV", "d": { "name": "result", "address": 0 }, "s1": { "name": "temp", "address": 0 } }
        ]
    }))
    .unwrap();

    let mut program = Program::new();
    program.add_object_code(&obj, Stage::Vertex).unwrap();
    assert!(program.render(Stage::Vertex).contains("scratch_f32[0] = temp_f32[0];"));

    program.build().unwrap();
    program.set_uniform_data("a", &A);
    program.vertex().unwrap();
    assert_close("DP4", &program.result_data(0, 4), &[29.0625; 4]);
}
