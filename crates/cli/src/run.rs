use clap::Args;
use scalarize_api::Stage;
use scalarize_core::program::load_object;
use scalarize_core::{Program, ProgramOptions};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Vertex stage IR object (JSON)
    #[arg(long, value_name = "IR_JSON")]
    pub vertex: PathBuf,
    /// Fragment stage IR object (JSON)
    #[arg(long, value_name = "IR_JSON")]
    pub fragment: PathBuf,
    /// Uniform data as NAME=V[,V...]
    #[arg(long = "uniform", value_name = "NAME=VALUES", value_parser = parse_assignment)]
    pub uniforms: Vec<(String, Vec<f32>)>,
    /// Attribute data as NAME=V[,V...]
    #[arg(long = "attribute", value_name = "NAME=VALUES", value_parser = parse_assignment)]
    pub attributes: Vec<(String, Vec<f32>)>,
    /// Slice of the result region to print, as START:SIZE
    #[arg(long, value_name = "START:SIZE", default_value = "0:4", value_parser = parse_range)]
    pub result: (usize, usize),
    /// Program options (JSON)
    #[arg(long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = match &args.config {
        Some(path) => ProgramOptions::from_file(path)?,
        None => ProgramOptions::default(),
    };

    let mut program = Program::with_options(options);
    program.add_object_code(&load_object(&args.vertex)?, Stage::Vertex)?;
    program.add_object_code(&load_object(&args.fragment)?, Stage::Fragment)?;
    program.build()?;

    for (name, data) in &args.uniforms {
        if program.uniform_location(name).is_none() {
            tracing::warn!("Uniform {} is not declared", name);
        }
        program.set_uniform_data(name, data);
    }
    for (name, data) in &args.attributes {
        if program.attribute_location(name).is_none() {
            tracing::warn!("Attribute {} is not declared", name);
        }
        program.set_attribute_data(name, data);
    }

    program.vertex()?;
    program.fragment()?;

    let (start, size) = args.result;
    info!("Reading result[{}..{}]", start, start + size);
    let values: Vec<String> = program
        .result_data(start, size)
        .iter()
        .map(|v| v.to_string())
        .collect();
    println!("[{}]", values.join(", "));
    Ok(())
}

pub(crate) fn parse_assignment(s: &str) -> Result<(String, Vec<f32>), String> {
    let (name, values) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUES, got {s:?}"))?;
    let values = values
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((name.trim().to_string(), values))
}

pub(crate) fn parse_range(s: &str) -> Result<(usize, usize), String> {
    let (start, size) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:SIZE, got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<usize>().map_err(|e| format!("{v:?}: {e}"));
    Ok((parse(start)?, parse(size)?))
}
