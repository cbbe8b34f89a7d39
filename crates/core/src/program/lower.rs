//! Lowering of generated statements to region-resolved ops, and their
//! interpretation over the shared buffer.

use super::buffer::SharedBuffer;
use crate::config::RegionLayout;
use crate::translate::{Expr, Line, Slot, Statement, Value};
use scalarize_api::{BuildError, BuildResult, Region};

/// Host texture lookup: `(u, v, level)` to four channels.
pub type TexFunction = Box<dyn Fn(f32, f32, f32) -> [f32; 4]>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// Absolute index into the shared buffer.
    Element(usize),
    Const(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Store { dest: usize, expr: Expr<Operand> },
    /// Continue at `target` when `cond` is zero.
    BranchIfZero { cond: Operand, target: usize },
    Jump(usize),
    Return,
}

/// A stage entry point ready to run against a [`SharedBuffer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledStage {
    ops: Vec<Op>,
}

struct Frame {
    branch: usize,
    jump: Option<usize>,
}

impl CompiledStage {
    pub fn lower(lines: &[Line], layout: &RegionLayout) -> BuildResult<Self> {
        let mut ops = Vec::new();
        let mut frames: Vec<Frame> = Vec::new();

        for stmt in lines.iter().filter_map(Line::statement) {
            match stmt {
                Statement::Assign { dest, expr } => ops.push(Op::Store {
                    dest: element(dest, layout)?,
                    expr: expr.try_map(&mut |value| operand(value, layout))?,
                }),
                Statement::If(cond) => {
                    frames.push(Frame {
                        branch: ops.len(),
                        jump: None,
                    });
                    ops.push(Op::BranchIfZero {
                        cond: operand(cond, layout)?,
                        target: usize::MAX,
                    });
                }
                Statement::Else => {
                    let frame = frames
                        .last_mut()
                        .filter(|f| f.jump.is_none())
                        .ok_or(BuildError::UnbalancedControlFlow("ELSE without IF"))?;
                    let jump = ops.len();
                    ops.push(Op::Jump(usize::MAX));
                    patch(&mut ops[frame.branch], jump + 1);
                    frame.jump = Some(jump);
                }
                Statement::EndIf => {
                    let frame = frames
                        .pop()
                        .ok_or(BuildError::UnbalancedControlFlow("ENDIF without IF"))?;
                    let end = ops.len();
                    patch(&mut ops[frame.jump.unwrap_or(frame.branch)], end);
                }
                Statement::Return => ops.push(Op::Return),
            }
        }

        if !frames.is_empty() {
            return Err(BuildError::UnbalancedControlFlow("IF without ENDIF"));
        }
        Ok(Self { ops })
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn run(&self, buffer: &mut SharedBuffer, tex: &dyn Fn(f32, f32, f32) -> [f32; 4]) {
        let mut pc = 0;
        while let Some(op) = self.ops.get(pc) {
            pc += 1;
            match op {
                Op::Store { dest, expr } => {
                    let value = eval(expr, buffer, tex);
                    buffer.set(*dest, value);
                }
                Op::BranchIfZero { cond, target } => {
                    if read(*cond, buffer) == 0.0 {
                        pc = *target;
                    }
                }
                Op::Jump(target) => pc = *target,
                Op::Return => break,
            }
        }
    }
}

fn patch(op: &mut Op, to: usize) {
    match op {
        Op::BranchIfZero { target, .. } | Op::Jump(target) => *target = to,
        _ => {}
    }
}

fn element(slot: &Slot, layout: &RegionLayout) -> BuildResult<usize> {
    let region = Region::from_name(&slot.base).ok_or_else(|| BuildError::UnknownRegion {
        name: slot.base.clone(),
    })?;
    let capacity = layout.capacity(region);
    if slot.index >= capacity {
        return Err(BuildError::OutOfBounds {
            region,
            index: slot.index,
            capacity,
        });
    }
    Ok(layout.offset_of(region) + slot.index)
}

fn operand(value: &Value, layout: &RegionLayout) -> BuildResult<Operand> {
    match value {
        Value::Slot(slot) => Ok(Operand::Element(element(slot, layout)?)),
        Value::Const(c) => Ok(Operand::Const(*c)),
        Value::Literal(name) => name
            .trim()
            .parse::<f32>()
            .map(Operand::Const)
            .map_err(|_| BuildError::UnresolvedLiteral { name: name.clone() }),
    }
}

fn read(operand: Operand, buffer: &SharedBuffer) -> f32 {
    match operand {
        Operand::Element(index) => buffer.get(index),
        Operand::Const(c) => c,
    }
}

fn eval(
    expr: &Expr<Operand>,
    buffer: &SharedBuffer,
    tex: &dyn Fn(f32, f32, f32) -> [f32; 4],
) -> f32 {
    match expr {
        Expr::Leaf(operand) => read(*operand, buffer),
        Expr::Unary(op, x) => op.apply(eval(x, buffer, tex)),
        Expr::Binary(op, a, b) => op.apply(eval(a, buffer, tex), eval(b, buffer, tex)),
        Expr::Select {
            cond,
            negative,
            otherwise,
        } => {
            if eval(cond, buffer, tex) < 0.0 {
                eval(negative, buffer, tex)
            } else {
                eval(otherwise, buffer, tex)
            }
        }
        Expr::Sample { u, v, lod, channel } => {
            let texel = tex(
                eval(u, buffer, tex),
                eval(v, buffer, tex),
                eval(lod, buffer, tex),
            );
            texel.get(*channel).copied().unwrap_or(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(s: Statement) -> Line {
        Line::Stmt(s)
    }

    fn assign(base: &str, index: usize, c: f32) -> Line {
        stmt(Statement::Assign {
            dest: Slot::new(base, index),
            expr: Expr::leaf(Value::Const(c)),
        })
    }

    #[test]
    fn test_lower_resolves_regions() {
        let layout = RegionLayout::default();
        let stage = CompiledStage::lower(&[assign("result_f32", 1, 2.0)], &layout).unwrap();
        assert_eq!(
            stage.ops(),
            &[Op::Store {
                dest: layout.offset_of(Region::Result) + 1,
                expr: Expr::leaf(Operand::Const(2.0)),
            }]
        );
    }

    #[test]
    fn test_lower_rejects_unknown_region_and_bounds() {
        let layout = RegionLayout::default();
        assert_eq!(
            CompiledStage::lower(&[assign("dest_f32", 0, 1.0)], &layout),
            Err(BuildError::UnknownRegion {
                name: "dest_f32".into()
            })
        );
        assert!(matches!(
            CompiledStage::lower(&[assign("scratch_f32", 4, 1.0)], &layout),
            Err(BuildError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_if_else_branches() {
        let layout = RegionLayout::default();
        let lines = vec![
            stmt(Statement::If(Value::Slot(Slot::new("uniform_f32", 0)))),
            assign("result_f32", 0, 1.0),
            stmt(Statement::Else),
            assign("result_f32", 0, 2.0),
            stmt(Statement::EndIf),
        ];
        let stage = CompiledStage::lower(&lines, &layout).unwrap();
        let tex = |_: f32, _: f32, _: f32| [0.0f32; 4];

        let mut buffer = SharedBuffer::new(layout);
        stage.run(&mut buffer, &tex);
        assert_eq!(buffer.read(Region::Result, 0, 1), vec![2.0]);

        buffer.write(Region::Uniform, 0, &[1.0], 1);
        stage.run(&mut buffer, &tex);
        assert_eq!(buffer.read(Region::Result, 0, 1), vec![1.0]);
    }

    #[test]
    fn test_return_stops_execution() {
        let layout = RegionLayout::default();
        let lines = vec![
            assign("temp_f32", 0, 1.0),
            stmt(Statement::Return),
            assign("temp_f32", 0, 2.0),
        ];
        let stage = CompiledStage::lower(&lines, &layout).unwrap();
        let mut buffer = SharedBuffer::new(layout);
        stage.run(&mut buffer, &|_: f32, _: f32, _: f32| [0.0f32; 4]);
        assert_eq!(buffer.read(Region::Temp, 0, 1), vec![1.0]);
    }

    #[test]
    fn test_unbalanced_control_flow() {
        let layout = RegionLayout::default();
        for lines in [
            vec![stmt(Statement::Else)],
            vec![stmt(Statement::EndIf)],
            vec![stmt(Statement::If(Value::Const(1.0)))],
            vec![
                stmt(Statement::If(Value::Const(1.0))),
                stmt(Statement::Else),
                stmt(Statement::Else),
            ],
        ] {
            assert!(matches!(
                CompiledStage::lower(&lines, &layout),
                Err(BuildError::UnbalancedControlFlow(_))
            ));
        }
    }

    #[test]
    fn test_numeric_literals_become_constants() {
        let layout = RegionLayout::default();
        assert_eq!(
            operand(&Value::Literal("0.5".into()), &layout),
            Ok(Operand::Const(0.5))
        );
        assert!(operand(&Value::Literal("sampler".into()), &layout).is_err());
    }
}
