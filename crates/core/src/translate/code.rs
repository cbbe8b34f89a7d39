//! Typed model of generated scalar code.
//!
//! Templates and generated statements share [`Expr`], parameterised over the
//! leaf type: templates carry [`super::opcode::Term`] placeholders, generated
//! code carries concrete [`Value`]s. Rendering goes through `Display`.

use std::fmt;

/// One element of a storage buffer, e.g. `temp_f32[6]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub base: String,
    pub index: usize,
}

impl Slot {
    pub fn new(base: impl Into<String>, index: usize) -> Self {
        Self {
            base: base.into(),
            index,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.base, self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Slot(Slot),
    /// Raw operand text, substituted as-is.
    Literal(String),
    Const(f32),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Slot(slot) => write!(f, "{}", slot),
            Value::Literal(name) => f.write_str(name),
            Value::Const(c) => write!(f, "{:?}", c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Abs,
    Rsq,
    Rcp,
    Floor,
    Fract,
    Sin,
    Cos,
}

impl UnaryOp {
    pub fn apply(self, x: f32) -> f32 {
        match self {
            UnaryOp::Abs => x.abs(),
            UnaryOp::Rsq => 1.0 / x.sqrt(),
            UnaryOp::Rcp => 1.0 / x,
            UnaryOp::Floor => x.floor(),
            UnaryOp::Fract => x - x.floor(),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
        }
    }

    fn function_name(self) -> &'static str {
        match self {
            UnaryOp::Abs => "abs",
            UnaryOp::Rsq => "inversesqrt",
            UnaryOp::Rcp => "rcp",
            UnaryOp::Floor => "floor",
            UnaryOp::Fract => "fract",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Min,
    Max,
    Pow,
    /// Comparisons yield 1.0 or 0.0.
    Lt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    pub fn apply(self, a: f32, b: f32) -> f32 {
        let flag = |cond: bool| if cond { 1.0 } else { 0.0 };
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Min => a.min(b),
            BinaryOp::Max => a.max(b),
            BinaryOp::Pow => a.powf(b),
            BinaryOp::Lt => flag(a < b),
            BinaryOp::Ge => flag(a >= b),
            BinaryOp::Eq => flag(a == b),
            BinaryOp::Ne => flag(a != b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<L> {
    Leaf(L),
    Unary(UnaryOp, Box<Expr<L>>),
    Binary(BinaryOp, Box<Expr<L>>, Box<Expr<L>>),
    /// `cond < 0 ? negative : otherwise`
    Select {
        cond: Box<Expr<L>>,
        negative: Box<Expr<L>>,
        otherwise: Box<Expr<L>>,
    },
    /// One channel of the host texture sampler's result.
    Sample {
        u: Box<Expr<L>>,
        v: Box<Expr<L>>,
        lod: Box<Expr<L>>,
        channel: usize,
    },
}

impl<L> Expr<L> {
    pub fn leaf(leaf: L) -> Self {
        Expr::Leaf(leaf)
    }

    pub fn unary(op: UnaryOp, x: Expr<L>) -> Self {
        Expr::Unary(op, Box::new(x))
    }

    pub fn binary(op: BinaryOp, a: Expr<L>, b: Expr<L>) -> Self {
        Expr::Binary(op, Box::new(a), Box::new(b))
    }

    pub fn select(cond: Expr<L>, negative: Expr<L>, otherwise: Expr<L>) -> Self {
        Expr::Select {
            cond: Box::new(cond),
            negative: Box::new(negative),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn sample(u: Expr<L>, v: Expr<L>, lod: Expr<L>) -> Self {
        Expr::Sample {
            u: Box::new(u),
            v: Box::new(v),
            lod: Box::new(lod),
            channel: 0,
        }
    }

    /// Rebuild the tree with every leaf replaced by `f(leaf)`.
    pub fn map<M>(&self, f: &mut impl FnMut(&L) -> M) -> Expr<M> {
        match self {
            Expr::Leaf(leaf) => Expr::Leaf(f(leaf)),
            Expr::Unary(op, x) => Expr::Unary(*op, Box::new(x.map(f))),
            Expr::Binary(op, a, b) => Expr::Binary(*op, Box::new(a.map(f)), Box::new(b.map(f))),
            Expr::Select {
                cond,
                negative,
                otherwise,
            } => Expr::Select {
                cond: Box::new(cond.map(f)),
                negative: Box::new(negative.map(f)),
                otherwise: Box::new(otherwise.map(f)),
            },
            Expr::Sample { u, v, lod, channel } => Expr::Sample {
                u: Box::new(u.map(f)),
                v: Box::new(v.map(f)),
                lod: Box::new(lod.map(f)),
                channel: *channel,
            },
        }
    }

    pub fn try_map<M, E>(&self, f: &mut impl FnMut(&L) -> Result<M, E>) -> Result<Expr<M>, E> {
        Ok(match self {
            Expr::Leaf(leaf) => Expr::Leaf(f(leaf)?),
            Expr::Unary(op, x) => Expr::Unary(*op, Box::new(x.try_map(f)?)),
            Expr::Binary(op, a, b) => {
                Expr::Binary(*op, Box::new(a.try_map(f)?), Box::new(b.try_map(f)?))
            }
            Expr::Select {
                cond,
                negative,
                otherwise,
            } => Expr::Select {
                cond: Box::new(cond.try_map(f)?),
                negative: Box::new(negative.try_map(f)?),
                otherwise: Box::new(otherwise.try_map(f)?),
            },
            Expr::Sample { u, v, lod, channel } => Expr::Sample {
                u: Box::new(u.try_map(f)?),
                v: Box::new(v.try_map(f)?),
                lod: Box::new(lod.try_map(f)?),
                channel: *channel,
            },
        })
    }

    /// Visit leaves left to right.
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a L)) {
        match self {
            Expr::Leaf(leaf) => f(leaf),
            Expr::Unary(_, x) => x.for_each_leaf(f),
            Expr::Binary(_, a, b) => {
                a.for_each_leaf(f);
                b.for_each_leaf(f);
            }
            Expr::Select {
                cond,
                negative,
                otherwise,
            } => {
                cond.for_each_leaf(f);
                negative.for_each_leaf(f);
                otherwise.for_each_leaf(f);
            }
            Expr::Sample { u, v, lod, .. } => {
                u.for_each_leaf(f);
                v.for_each_leaf(f);
                lod.for_each_leaf(f);
            }
        }
    }

    /// Point every sampler read at `channel`.
    pub fn with_channel(mut self, channel: usize) -> Self {
        self.set_channel(channel);
        self
    }

    fn set_channel(&mut self, value: usize) {
        match self {
            Expr::Leaf(_) => {}
            Expr::Unary(_, x) => x.set_channel(value),
            Expr::Binary(_, a, b) => {
                a.set_channel(value);
                b.set_channel(value);
            }
            Expr::Select {
                cond,
                negative,
                otherwise,
            } => {
                cond.set_channel(value);
                negative.set_channel(value);
                otherwise.set_channel(value);
            }
            Expr::Sample { channel, .. } => *channel = value,
        }
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            Expr::Binary(..) | Expr::Select { .. } | Expr::Unary(UnaryOp::Rcp, _)
        )
    }
}

struct Operand<'a, L>(&'a Expr<L>);

impl<L: fmt::Display> fmt::Display for Operand<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_compound() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl<L: fmt::Display> fmt::Display for Expr<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Leaf(leaf) => fmt::Display::fmt(leaf, f),
            Expr::Unary(UnaryOp::Rcp, x) => write!(f, "1.0 / {}", Operand(x)),
            Expr::Unary(op, x) => write!(f, "{}({})", op.function_name(), x),
            Expr::Binary(op, a, b) => {
                let (a, b) = (Operand(a), Operand(b));
                match op {
                    BinaryOp::Add => write!(f, "{} + {}", a, b),
                    BinaryOp::Sub => write!(f, "{} - {}", a, b),
                    BinaryOp::Mul => write!(f, "{} * {}", a, b),
                    BinaryOp::Min => write!(f, "min({}, {})", a, b),
                    BinaryOp::Max => write!(f, "max({}, {})", a, b),
                    BinaryOp::Pow => write!(f, "pow({}, {})", a, b),
                    BinaryOp::Lt => write!(f, "({} < {}) ? 1.0 : 0.0", a, b),
                    BinaryOp::Ge => write!(f, "({} >= {}) ? 1.0 : 0.0", a, b),
                    BinaryOp::Eq => write!(f, "({} == {}) ? 1.0 : 0.0", a, b),
                    BinaryOp::Ne => write!(f, "({} != {}) ? 1.0 : 0.0", a, b),
                }
            }
            Expr::Select {
                cond,
                negative,
                otherwise,
            } => write!(
                f,
                "({} < 0.0) ? {} : {}",
                Operand(cond),
                Operand(negative),
                Operand(otherwise)
            ),
            Expr::Sample { u, v, lod, channel } => {
                write!(f, "tex({}, {}, {})[{}]", u, v, lod, channel)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign { dest: Slot, expr: Expr<Value> },
    /// Opens a block taken when the value is non-zero.
    If(Value),
    Else,
    EndIf,
    Return,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assign { dest, expr } => write!(f, "{} = {};", dest, expr),
            Statement::If(cond) => write!(f, "if ({}) {{", cond),
            Statement::Else => f.write_str("} else {"),
            Statement::EndIf => f.write_str("}"),
            Statement::Return => f.write_str("return;"),
        }
    }
}

/// One line of a stage's generated code.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Echo of the IR instruction that produced the following block.
    Trace(String),
    /// Comment pseudo-instruction carried over from the IR.
    Note(String),
    Stmt(Statement),
    Blank,
}

impl Line {
    pub fn statement(&self) -> Option<&Statement> {
        match self {
            Line::Stmt(stmt) => Some(stmt),
            _ => None,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Trace(text) => write!(f, "// {}", text),
            Line::Note(text) => write!(f, "    // {}", text),
            Line::Stmt(stmt) => write!(f, "    {}", stmt),
            Line::Blank => Ok(()),
        }
    }
}
