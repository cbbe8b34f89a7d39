//! Program assembly: merges declared symbols, drives translation per stage
//! and exposes the shared buffer to the host.

mod buffer;
mod lower;

pub use buffer::SharedBuffer;
pub use lower::{CompiledStage, Op, Operand, TexFunction};

use crate::config::ProgramOptions;
use crate::layout::VariableLayout;
use crate::translate::{Line, Translator};
use crate::types::{BuiltinTypes, TypeSizeTable};
use scalarize_api::{
    BuildError, BuildResult, CompileError, CompileResult, IrObject, Region, Stage, StorageClass,
};
use tracing::{info, warn};

struct CompiledProgram {
    vertex: CompiledStage,
    fragment: CompiledStage,
}

/// A vertex/fragment program pair over one shared buffer.
///
/// Not thread-safe by construction: stage invocation and data accessors all
/// mutate the same buffer.
pub struct Program {
    options: ProgramOptions,
    translator: Translator,
    types: Box<dyn TypeSizeTable>,
    layout: VariableLayout,
    vertex_code: Vec<Line>,
    fragment_code: Vec<Line>,
    buffer: SharedBuffer,
    tex: TexFunction,
    compiled: Option<CompiledProgram>,
    error: Option<CompileError>,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    pub fn new() -> Self {
        Self::with_options(ProgramOptions::default())
    }

    pub fn with_options(options: ProgramOptions) -> Self {
        Self {
            translator: Translator::new(options.trace_comments),
            types: Box::new(BuiltinTypes),
            layout: VariableLayout::new(),
            vertex_code: Vec::new(),
            fragment_code: Vec::new(),
            buffer: SharedBuffer::new(options.layout),
            tex: Box::new(|_: f32, _: f32, _: f32| [0.0f32; 4]),
            compiled: None,
            error: None,
            options,
        }
    }

    /// Replace the type-size table used when merging declared symbols.
    pub fn with_type_sizes(mut self, types: impl TypeSizeTable + 'static) -> Self {
        self.types = Box::new(types);
        self
    }

    pub fn options(&self) -> &ProgramOptions {
        &self.options
    }

    /// Merge an object's declared symbols and append its translated code to
    /// `stage`.
    ///
    /// All or nothing: on failure neither the layout nor the stage code
    /// changes, and the error is kept for [`Self::last_error`]. Success
    /// clears it.
    pub fn add_object_code(&mut self, object: &IrObject, stage: Stage) -> CompileResult<()> {
        let result = VariableLayout::collect(&object.symbols, self.types.as_ref())
            .and_then(|entries| Ok((entries, self.translator.translate(&object.code)?)));

        match result {
            Ok((entries, lines)) => {
                self.layout.extend(entries);
                info!(
                    "Accepted {} object: {} instruction(s), {} line(s)",
                    stage,
                    object.instructions().count(),
                    lines.len()
                );
                self.stage_code_mut(stage).extend(lines);
                self.compiled = None;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Rejected {} object: {}", stage, e);
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn last_error(&self) -> Option<&CompileError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Lower both stages onto the shared buffer.
    pub fn build(&mut self) -> BuildResult<()> {
        let layout = &self.options.layout;
        let vertex = CompiledStage::lower(&self.vertex_code, layout)?;
        let fragment = CompiledStage::lower(&self.fragment_code, layout)?;
        info!(
            "Built program: {} vertex op(s), {} fragment op(s)",
            vertex.ops().len(),
            fragment.ops().len()
        );
        self.compiled = Some(CompiledProgram { vertex, fragment });
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn vertex(&mut self) -> BuildResult<()> {
        self.run(Stage::Vertex)
    }

    pub fn fragment(&mut self) -> BuildResult<()> {
        self.run(Stage::Fragment)
    }

    pub fn run(&mut self, stage: Stage) -> BuildResult<()> {
        let compiled = self.compiled.as_ref().ok_or(BuildError::NotBuilt)?;
        let code = match stage {
            Stage::Vertex => &compiled.vertex,
            Stage::Fragment => &compiled.fragment,
        };
        code.run(&mut self.buffer, self.tex.as_ref());
        Ok(())
    }

    pub fn set_tex_function(&mut self, tex: impl Fn(f32, f32, f32) -> [f32; 4] + 'static) {
        self.tex = Box::new(tex);
    }

    pub fn stage_code(&self, stage: Stage) -> &[Line] {
        match stage {
            Stage::Vertex => &self.vertex_code,
            Stage::Fragment => &self.fragment_code,
        }
    }

    fn stage_code_mut(&mut self, stage: Stage) -> &mut Vec<Line> {
        match stage {
            Stage::Vertex => &mut self.vertex_code,
            Stage::Fragment => &mut self.fragment_code,
        }
    }

    /// Generated code of `stage` as text.
    pub fn render(&self, stage: Stage) -> String {
        self.stage_code(stage)
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    // ---- Interface variables ----

    pub fn uniform_location(&self, name: &str) -> Option<usize> {
        self.layout.location(StorageClass::Uniform, name)
    }

    pub fn uniform_size(&self, name: &str) -> Option<usize> {
        self.layout.size(StorageClass::Uniform, name)
    }

    /// Write `data` at the uniform's location; unknown names are ignored.
    pub fn set_uniform_data(&mut self, name: &str, data: &[f32]) {
        self.set_data(StorageClass::Uniform, name, data);
    }

    pub fn attribute_location(&self, name: &str) -> Option<usize> {
        self.layout.location(StorageClass::Attribute, name)
    }

    pub fn attribute_size(&self, name: &str) -> Option<usize> {
        self.layout.size(StorageClass::Attribute, name)
    }

    /// Write `data` at the attribute's location; unknown names are ignored.
    pub fn set_attribute_data(&mut self, name: &str, data: &[f32]) {
        self.set_data(StorageClass::Attribute, name, data);
    }

    pub fn varying_location(&self, name: &str) -> Option<usize> {
        self.layout.location(StorageClass::Varying, name)
    }

    pub fn varying_size(&self, name: &str) -> Option<usize> {
        self.layout.size(StorageClass::Varying, name)
    }

    fn set_data(&mut self, class: StorageClass, name: &str, data: &[f32]) {
        let Some(loc) = self.layout.get(class, name) else {
            tracing::debug!("Ignoring data for unknown {} {}", class, name);
            return;
        };
        let written = self.buffer.write(Region::from(class), loc.start, data, loc.size);
        if written < data.len().min(loc.size) {
            warn!("{} {} truncated to {} element(s)", class, name, written);
        }
    }

    pub fn result_data(&self, start: usize, size: usize) -> Vec<f32> {
        self.buffer.read(Region::Result, start, size)
    }

    pub fn varying_data(&self, start: usize, size: usize) -> Vec<f32> {
        self.buffer.read(Region::Varying, start, size)
    }
}

/// Read an IR object from a JSON file.
pub fn load_object(path: &std::path::Path) -> crate::Result<IrObject> {
    let text = std::fs::read_to_string(path)?;
    Ok(IrObject::from_json(&text)?)
}
