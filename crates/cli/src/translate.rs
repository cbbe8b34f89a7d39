use scalarize_api::Stage;
use scalarize_core::program::load_object;
use scalarize_core::{Program, ProgramOptions};
use std::path::Path;
use tracing::info;

pub fn run(path: &Path, stage: Stage, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let options = match config {
        Some(config) => ProgramOptions::from_file(config)?,
        None => ProgramOptions::default(),
    };
    let object = load_object(path)?;

    info!("Translating {} as {} stage", path.display(), stage);
    let mut program = Program::with_options(options);
    program.add_object_code(&object, stage)?;

    println!("{}", program.render(stage));
    Ok(())
}
