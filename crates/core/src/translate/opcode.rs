//! Opcode set and per-opcode translation templates.

use super::code::{BinaryOp, Expr, UnaryOp};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Abs,
    Add,
    Cmp,
    Cos,
    Dp3,
    Dp4,
    Dph,
    Else,
    Endif,
    Flr,
    Frc,
    If,
    Lrp,
    Mad,
    Max,
    Min,
    Mov,
    Mul,
    Pow,
    Rcp,
    Ret,
    Rsq,
    Seq,
    Sge,
    Sin,
    Slt,
    Sne,
    Sub,
    Tex,
}

impl Opcode {
    pub const ALL: [Opcode; 29] = [
        Opcode::Abs,
        Opcode::Add,
        Opcode::Cmp,
        Opcode::Cos,
        Opcode::Dp3,
        Opcode::Dp4,
        Opcode::Dph,
        Opcode::Else,
        Opcode::Endif,
        Opcode::Flr,
        Opcode::Frc,
        Opcode::If,
        Opcode::Lrp,
        Opcode::Mad,
        Opcode::Max,
        Opcode::Min,
        Opcode::Mov,
        Opcode::Mul,
        Opcode::Pow,
        Opcode::Rcp,
        Opcode::Ret,
        Opcode::Rsq,
        Opcode::Seq,
        Opcode::Sge,
        Opcode::Sin,
        Opcode::Slt,
        Opcode::Sne,
        Opcode::Sub,
        Opcode::Tex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::Abs => "ABS",
            Opcode::Add => "ADD",
            Opcode::Cmp => "CMP",
            Opcode::Cos => "COS",
            Opcode::Dp3 => "DP3",
            Opcode::Dp4 => "DP4",
            Opcode::Dph => "DPH",
            Opcode::Else => "ELSE",
            Opcode::Endif => "ENDIF",
            Opcode::Flr => "FLR",
            Opcode::Frc => "FRC",
            Opcode::If => "IF",
            Opcode::Lrp => "LRP",
            Opcode::Mad => "MAD",
            Opcode::Max => "MAX",
            Opcode::Min => "MIN",
            Opcode::Mov => "MOV",
            Opcode::Mul => "MUL",
            Opcode::Pow => "POW",
            Opcode::Rcp => "RCP",
            Opcode::Ret => "RET",
            Opcode::Rsq => "RSQ",
            Opcode::Seq => "SEQ",
            Opcode::Sge => "SGE",
            Opcode::Sin => "SIN",
            Opcode::Slt => "SLT",
            Opcode::Sne => "SNE",
            Opcode::Sub => "SUB",
            Opcode::Tex => "TEX",
        }
    }

    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            Opcode::If | Opcode::Else | Opcode::Endif | Opcode::Ret
        )
    }

    /// Number of source operands the template reads.
    pub fn arity(&self) -> usize {
        match self {
            Opcode::Else | Opcode::Endif | Opcode::Ret => 0,
            Opcode::Abs
            | Opcode::Cos
            | Opcode::Flr
            | Opcode::Frc
            | Opcode::If
            | Opcode::Mov
            | Opcode::Rcp
            | Opcode::Rsq
            | Opcode::Sin
            | Opcode::Tex => 1,
            Opcode::Add
            | Opcode::Dp3
            | Opcode::Dp4
            | Opcode::Dph
            | Opcode::Max
            | Opcode::Min
            | Opcode::Mul
            | Opcode::Pow
            | Opcode::Seq
            | Opcode::Sge
            | Opcode::Slt
            | Opcode::Sne
            | Opcode::Sub => 2,
            Opcode::Cmp | Opcode::Lrp | Opcode::Mad => 3,
        }
    }

    pub fn template(&self) -> Template {
        use Template::Vector;

        let unary = |op| Vector(Expr::unary(op, lane(0)));
        let binary = |op| Vector(Expr::binary(op, lane(0), lane(1)));

        match self {
            Opcode::If => Template::If,
            Opcode::Else => Template::Else,
            Opcode::Endif => Template::EndIf,
            Opcode::Ret => Template::Return,

            Opcode::Mov => Vector(lane(0)),
            Opcode::Abs => unary(UnaryOp::Abs),
            Opcode::Rsq => unary(UnaryOp::Rsq),
            Opcode::Rcp => unary(UnaryOp::Rcp),
            Opcode::Flr => unary(UnaryOp::Floor),
            Opcode::Frc => unary(UnaryOp::Fract),
            Opcode::Sin => unary(UnaryOp::Sin),
            Opcode::Cos => unary(UnaryOp::Cos),

            Opcode::Add => binary(BinaryOp::Add),
            Opcode::Sub => binary(BinaryOp::Sub),
            Opcode::Mul => binary(BinaryOp::Mul),
            Opcode::Min => binary(BinaryOp::Min),
            Opcode::Max => binary(BinaryOp::Max),
            Opcode::Slt => binary(BinaryOp::Lt),
            Opcode::Sge => binary(BinaryOp::Ge),
            Opcode::Seq => binary(BinaryOp::Eq),
            Opcode::Sne => binary(BinaryOp::Ne),

            Opcode::Mad => Vector(Expr::binary(
                BinaryOp::Add,
                Expr::binary(BinaryOp::Mul, lane(0), lane(1)),
                lane(2),
            )),
            Opcode::Lrp => Vector(Expr::binary(
                BinaryOp::Add,
                Expr::binary(BinaryOp::Mul, lane(0), lane(1)),
                Expr::binary(
                    BinaryOp::Mul,
                    Expr::binary(BinaryOp::Sub, Expr::leaf(Term::Const(1.0)), lane(0)),
                    lane(2),
                ),
            )),
            Opcode::Cmp => Vector(Expr::select(lane(0), lane(1), lane(2))),

            Opcode::Dp3 => Vector(dot(3)),
            Opcode::Dp4 => Vector(dot(4)),
            Opcode::Dph => Vector(Expr::binary(BinaryOp::Add, dot(3), fixed(1, 3))),
            Opcode::Pow => Vector(Expr::binary(BinaryOp::Pow, fixed(0, 0), fixed(1, 0))),

            Opcode::Tex => Vector(Expr::sample(
                fixed(0, 0),
                fixed(0, 1),
                Expr::leaf(Term::Const(0.0)),
            )),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Opcode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or(())
    }
}

/// Placeholder in a template expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Term {
    /// Source operand `n`, at the destination position being generated.
    Lane(usize),
    /// Source operand `n`, at a fixed logical position.
    Fixed(usize, usize),
    Const(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    /// One assignment per destination component.
    Vector(Expr<Term>),
    /// Condition is the first source at position 0.
    If,
    Else,
    EndIf,
    Return,
}

fn lane(source: usize) -> Expr<Term> {
    Expr::leaf(Term::Lane(source))
}

fn fixed(source: usize, position: usize) -> Expr<Term> {
    Expr::leaf(Term::Fixed(source, position))
}

fn dot(width: usize) -> Expr<Term> {
    (1..width).fold(
        Expr::binary(BinaryOp::Mul, fixed(0, 0), fixed(1, 0)),
        |acc, k| {
            Expr::binary(
                BinaryOp::Add,
                acc,
                Expr::binary(BinaryOp::Mul, fixed(0, k), fixed(1, k)),
            )
        },
    )
}
