use scalarize_api::{Stage, StorageClass};
use scalarize_core::Program;
use scalarize_core::program::load_object;
use std::path::PathBuf;
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct LayoutRow {
    #[tabled(rename = "Class")]
    class: StorageClass,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Start")]
    start: usize,
    #[tabled(rename = "Size")]
    size: usize,
}

pub fn run(paths: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let mut program = Program::new();
    for path in paths {
        let object = load_object(path)?;
        // Stage is irrelevant for the layout; the registry is shared.
        program.add_object_code(&object, Stage::Vertex)?;
    }

    let layout = program.layout();
    let rows: Vec<LayoutRow> = StorageClass::ALL
        .into_iter()
        .flat_map(|class| {
            layout.entries(class).map(move |(name, loc)| LayoutRow {
                class,
                name: name.to_string(),
                start: loc.start,
                size: loc.size,
            })
        })
        .collect();

    if rows.is_empty() {
        println!("No interface variables declared.");
        return Ok(());
    }

    println!("{}", Table::new(&rows).with(Style::psql()));
    Ok(())
}
