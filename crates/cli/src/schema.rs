use scalarize_api::IrObject;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let schema = schemars::schema_for!(IrObject);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
