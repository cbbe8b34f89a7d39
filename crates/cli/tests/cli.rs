use std::path::Path;
use std::process::Command;

fn write(dir: &Path, name: &str, value: serde_json::Value) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

fn scalarize(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_scalarize"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn test_translate_prints_generated_code() {
    let dir = tempfile::tempdir().unwrap();
    let ir = write(
        dir.path(),
        "vs.json",
        serde_json::json!({
            "code": [{ "op": "MOV",
                       "d": { "name": "result", "address": 0, "swizzle": "xy" },
                       "s1": { "name": "attribute", "address": 1, "swizzle": "xy" } }]
        }),
    );

    let out = scalarize(&["translate", ir.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("result_f32[0] = attribute_f32[4];"));
    assert!(stdout.contains("result_f32[1] = attribute_f32[5];"));
}

#[test]
fn test_translate_reports_unknown_opcode() {
    let dir = tempfile::tempdir().unwrap();
    let ir = write(
        dir.path(),
        "bad.json",
        serde_json::json!({ "code": [{ "op": "KIL" }] }),
    );

    let out = scalarize(&["translate", ir.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8(out.stderr).unwrap().contains("KIL"));
}

#[test]
fn test_run_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let vs = write(
        dir.path(),
        "vs.json",
        serde_json::json!({
            "symbols": {
                "attribute": [{ "name": "position", "type": "vec4", "out": "attribute@0" }],
                "varying": [{ "name": "v_pos", "type": "vec4", "out": "varying@0" }]
            },
            "code": [{ "op": "MOV", "d": { "name": "varying", "address": 0 },
                       "s1": { "name": "attribute", "address": 0 } }]
        }),
    );
    let fs = write(
        dir.path(),
        "fs.json",
        serde_json::json!({
            "symbols": { "uniform": [{ "name": "tint", "type": "vec4", "out": "uniform@0" }] },
            "code": [{ "op": "MUL", "d": { "name": "result", "address": 0 },
                       "s1": { "name": "varying", "address": 0 },
                       "s2": { "name": "uniform", "address": 0 } }]
        }),
    );

    let out = scalarize(&[
        "run",
        "--vertex",
        vs.to_str().unwrap(),
        "--fragment",
        fs.to_str().unwrap(),
        "--attribute",
        "position=1,2,3,4",
        "--uniform",
        "tint=2,2,2,0.5",
    ]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap().trim(), "[2, 4, 6, 2]");
}

#[test]
fn test_layout_lists_declared_symbols() {
    let dir = tempfile::tempdir().unwrap();
    let ir = write(
        dir.path(),
        "fs.json",
        serde_json::json!({
            "symbols": {
                "uniform": [{ "name": "tint", "type": "vec4", "out": "uniform@8" }],
                "varying": [{ "name": "v_uv", "type": "vec2", "out": "varying@0" }]
            }
        }),
    );

    let out = scalarize(&["layout", ir.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("tint"));
    assert!(stdout.contains("v_uv"));
    assert!(stdout.contains("Start"));
}
