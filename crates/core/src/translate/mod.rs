//! Instruction translation engine: vector IR in, scalar statements out.

pub mod code;
pub mod opcode;
pub mod operand;

pub use code::{BinaryOp, Expr, Line, Slot, Statement, UnaryOp, Value};
pub use opcode::{Opcode, Template, Term};
pub use operand::{ResolvedOperand, Role, SLOT_WIDTH, resolve_operand, swizzle_components};

use scalarize_api::{CompileError, CompileResult, IrEntry, IrInstruction, Region};
use tracing::{debug, trace, warn};

/// Translates instructions independently of each other; the only state is
/// output formatting.
#[derive(Debug, Clone, Copy)]
pub struct Translator {
    trace_comments: bool,
}

impl Default for Translator {
    fn default() -> Self {
        Self {
            trace_comments: true,
        }
    }
}

impl Translator {
    pub fn new(trace_comments: bool) -> Self {
        Self { trace_comments }
    }

    /// Translate a whole instruction list.
    ///
    /// Either every entry translates or nothing is returned.
    pub fn translate(&self, code: &[IrEntry]) -> CompileResult<Vec<Line>> {
        let mut lines = Vec::new();
        for entry in code {
            match entry {
                IrEntry::Comment(comment) => lines.push(Line::Note(comment.comment.clone())),
                IrEntry::Instruction(ins) => self.instruction(ins, &mut lines)?,
            }
        }
        Ok(lines)
    }

    /// Append the lines for one instruction to `out`.
    ///
    /// On error `out` may hold a partial block; callers discard the buffer.
    pub fn instruction(&self, ins: &IrInstruction, out: &mut Vec<Line>) -> CompileResult<()> {
        if self.trace_comments {
            out.push(Line::Trace(ins.to_string()));
        }

        let opcode: Opcode = ins.op.parse().map_err(|_| CompileError::UnknownOpcode {
            opcode: ins.op.clone(),
        })?;

        let dest = resolve_operand(ins.d.as_ref(), Role::Destination)?;
        let mut sources = Vec::with_capacity(3);
        for operand in ins.sources() {
            sources.push(resolve_operand(operand, Role::Source)?);
        }

        let statements = match opcode.template() {
            Template::If => {
                let cond = sources[0]
                    .as_ref()
                    .or(dest.as_ref())
                    .map(|op| op.value_at(0))
                    .unwrap_or_else(|| missing_source(opcode, 0));
                vec![Statement::If(cond)]
            }
            Template::Else => vec![Statement::Else],
            Template::EndIf => vec![Statement::EndIf],
            Template::Return => vec![Statement::Return],
            Template::Vector(template) => {
                let Some(dest @ ResolvedOperand::Addressed { .. }) = dest else {
                    return Err(CompileError::InvalidDestination {
                        opcode: opcode.to_string(),
                    });
                };
                expand(opcode, &template, &dest, &sources)
            }
        };

        debug!("{} -> {} statement(s)", ins, statements.len());
        for stmt in statements {
            trace!("  {}", stmt);
            out.push(Line::Stmt(stmt));
        }
        out.push(Line::Blank);
        Ok(())
    }
}

/// Instantiate `template` once per destination component.
fn expand(
    opcode: Opcode,
    template: &Expr<Term>,
    dest: &ResolvedOperand,
    sources: &[Option<ResolvedOperand>],
) -> Vec<Statement> {
    let components = dest.components().unwrap_or_default();

    let writes: Vec<(Slot, Expr<Value>)> = components
        .iter()
        .enumerate()
        .filter_map(|(position, &channel)| {
            let slot = dest.slot_at(position)?;
            let expr = template
                .map(&mut |term| bind(opcode, *term, position, sources))
                .with_channel(channel);
            Some((slot, expr))
        })
        .collect();

    snapshot_overlaps(writes)
}

fn bind(opcode: Opcode, term: Term, position: usize, sources: &[Option<ResolvedOperand>]) -> Value {
    let (source, at) = match term {
        Term::Const(c) => return Value::Const(c),
        Term::Lane(source) => (source, position),
        Term::Fixed(source, at) => (source, at),
    };
    match sources.get(source).and_then(Option::as_ref) {
        Some(operand) => operand.value_at(at),
        None => missing_source(opcode, source),
    }
}

fn missing_source(opcode: Opcode, source: usize) -> Value {
    warn!("{} reads missing source s{}; substituting 0.0", opcode, source + 1);
    Value::Const(0.0)
}

/// Route reads of already-overwritten destination elements through scratch.
///
/// A slot written by statement `i` and read by a later statement `j > i`
/// would otherwise be seen with its new value. Such slots are copied to the
/// scratch region up front and every read of them is redirected.
fn snapshot_overlaps(writes: Vec<(Slot, Expr<Value>)>) -> Vec<Statement> {
    let mut hazards: Vec<Slot> = Vec::new();
    for (i, (written, _)) in writes.iter().enumerate() {
        let read_later = writes[i + 1..].iter().any(|(_, expr)| {
            let mut hit = false;
            expr.for_each_leaf(&mut |value| {
                hit |= matches!(value, Value::Slot(slot) if slot == written);
            });
            hit
        });
        if read_later && !hazards.contains(written) {
            hazards.push(written.clone());
        }
    }

    if hazards.is_empty() {
        return writes
            .into_iter()
            .map(|(dest, expr)| Statement::Assign { dest, expr })
            .collect();
    }

    let scratch = Region::Scratch.buffer_name();
    let scratch_slot = |n: usize| Slot::new(scratch.clone(), n);
    debug!("Snapshotting {} overlapping element(s)", hazards.len());

    let mut statements: Vec<Statement> = hazards
        .iter()
        .enumerate()
        .map(|(n, slot)| Statement::Assign {
            dest: scratch_slot(n),
            expr: Expr::leaf(Value::Slot(slot.clone())),
        })
        .collect();

    statements.extend(writes.into_iter().map(|(dest, expr)| {
        let expr = expr.map(&mut |value| match value {
            Value::Slot(slot) => match hazards.iter().position(|h| h == slot) {
                Some(n) => Value::Slot(scratch_slot(n)),
                None => value.clone(),
            },
            other => other.clone(),
        });
        Statement::Assign { dest, expr }
    }));
    statements
}
