mod layout;
mod run;
mod schema;
mod translate;

use clap::{Parser, Subcommand, ValueEnum};
use scalarize_api::Stage;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scalarize",
    version,
    about = "Lower vector shader IR into scalar code",
    long_about = "Scalarize expands 4-wide vector IR instructions emitted by a GLSL front end into \
                  per-component scalar statements over a flat buffer, and can run the resulting \
                  vertex/fragment pair."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum CliStage {
    Vertex,
    Fragment,
}

impl From<CliStage> for Stage {
    fn from(stage: CliStage) -> Self {
        match stage {
            CliStage::Vertex => Stage::Vertex,
            CliStage::Fragment => Stage::Fragment,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the scalar code generated for an IR object
    Translate {
        /// IR object (JSON)
        #[arg(value_name = "IR_JSON")]
        path: PathBuf,
        /// Stage the object belongs to
        #[arg(long, value_enum, default_value = "vertex")]
        stage: CliStage,
        /// Program options (JSON)
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },
    /// Merge the declared symbols of one or more objects and print the layout
    Layout {
        /// IR objects (JSON)
        #[arg(value_name = "IR_JSON", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Build a vertex/fragment pair, run it once and print the result region
    #[command(
        long_about = "Builds both stages, writes the given uniform and attribute data, runs the \
                      vertex stage followed by the fragment stage and prints a slice of the \
                      result region."
    )]
    Run(run::RunArgs),
    /// Print the JSON schema of the IR object format
    Schema,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = scalarize_core::logging::init_logging("cli", true);

    match cli.command {
        Commands::Translate {
            path,
            stage,
            config,
        } => translate::run(&path, stage.into(), config.as_deref()),
        Commands::Layout { paths } => layout::run(&paths),
        Commands::Run(args) => run::run(args),
        Commands::Schema => schema::run(),
    }
}
