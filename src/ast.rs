//! Syntax tree produced by the parser.

use crate::heredoc::HeredocRef;

/// A parsed source unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub statements: Vec<Node>,
}

impl Program {
    /// Heredoc occurrences anywhere in the tree, including ones announced
    /// inside other heredoc bodies.
    #[must_use]
    pub fn heredoc_count(&self) -> usize {
        self.statements.iter().map(Node::heredoc_count).sum()
    }
}

/// Variable sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sigil {
    /// `$name`
    Scalar,
    /// `@name`
    Array,
    /// `%name`
    Hash,
    /// `&name`
    Code,
    /// `*name`
    Glob,
    /// `$#name`
    ArrayLength,
}

impl Sigil {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "$",
            Self::Array => "@",
            Self::Hash => "%",
            Self::Code => "&",
            Self::Glob => "*",
            Self::ArrayLength => "$#",
        }
    }
}

/// Subscript flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscript {
    /// `[...]`
    Array,
    /// `{...}`
    Hash,
}

/// One `if`/`elsif` arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub condition: Node,
    pub body: Vec<Node>,
}

/// Syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Number(String),
    /// Literal string after escape processing.
    Str(String),
    /// Double-quoted string with variable parts.
    Interpolated(Vec<Self>),
    /// Backtick or `qx` command.
    Command(Box<Self>),
    /// Heredoc placeholder, filled in once its line ends.
    Heredoc(HeredocRef),
    /// `qw(...)` word list.
    Words(Vec<String>),
    Variable {
        sigil: Sigil,
        name: String,
    },
    /// `${ EXPR }`, `@{ EXPR }`, `$$name`, ...
    Deref {
        sigil: Sigil,
        target: Box<Self>,
    },
    Bareword(String),
    /// Reference to a named I/O handle, by normalized name.
    HandleRef(String),
    /// `<STDIN>`, `<$fh>`.
    Readline(String),
    List(Vec<Self>),
    AnonArray(Vec<Self>),
    AnonHash(Vec<Self>),
    AnonSub(Vec<Self>),
    Index {
        base: Box<Self>,
        subscript: Subscript,
        index: Box<Self>,
    },
    Call {
        name: String,
        args: Vec<Self>,
    },
    /// `$code->(...)`, `&name(...)`.
    Invoke {
        target: Box<Self>,
        args: Vec<Self>,
    },
    MethodCall {
        invocant: Box<Self>,
        method: String,
        args: Vec<Self>,
    },
    /// `print`, `say`, `printf` with their optional destination.
    Print {
        function: String,
        handle: Option<Box<Self>>,
        args: Vec<Self>,
    },
    Return(Option<Box<Self>>),
    /// Argument forced into single-value context by a `$` prototype slot.
    Scalar(Box<Self>),
    Unary {
        op: String,
        operand: Box<Self>,
    },
    Postfix {
        op: String,
        operand: Box<Self>,
    },
    Binary {
        op: String,
        left: Box<Self>,
        right: Box<Self>,
    },
    Assign {
        op: String,
        target: Box<Self>,
        value: Box<Self>,
    },
    Ternary {
        condition: Box<Self>,
        then: Box<Self>,
        otherwise: Box<Self>,
    },
    /// `my`, `our`, `local`.
    Declare {
        declarator: String,
        target: Box<Self>,
    },
    Do(Vec<Self>),
    Block(Vec<Self>),
    If {
        /// `unless` negates the first condition.
        negated: bool,
        branches: Vec<Branch>,
        otherwise: Option<Vec<Self>>,
    },
    While {
        until: bool,
        condition: Box<Self>,
        body: Vec<Self>,
    },
    Foreach {
        variable: Option<Box<Self>>,
        list: Box<Self>,
        body: Vec<Self>,
    },
    SubDecl {
        name: String,
        prototype: Option<String>,
        body: Option<Vec<Self>>,
    },
    Package(String),
    /// `STATEMENT if COND` and friends.
    Modified {
        keyword: String,
        condition: Box<Self>,
        statement: Box<Self>,
    },
}

impl Node {
    #[must_use]
    pub fn unary(op: &str, operand: Self) -> Self {
        Self::Unary {
            op: op.to_string(),
            operand: Box::new(operand),
        }
    }

    #[must_use]
    pub fn binary(op: &str, left: Self, right: Self) -> Self {
        Self::Binary {
            op: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn call(name: &str, args: Vec<Self>) -> Self {
        Self::Call {
            name: name.to_string(),
            args,
        }
    }

    #[must_use]
    pub fn variable(sigil: Sigil, name: &str) -> Self {
        Self::Variable {
            sigil,
            name: name.to_string(),
        }
    }

    /// Direct child nodes, in source order. Heredoc content is not a
    /// child; it lives behind the shared placeholder.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Number(_)
            | Self::Str(_)
            | Self::Heredoc(_)
            | Self::Words(_)
            | Self::Variable { .. }
            | Self::Bareword(_)
            | Self::HandleRef(_)
            | Self::Readline(_)
            | Self::Package(_)
            | Self::Return(None) => Vec::new(),
            Self::Interpolated(items)
            | Self::List(items)
            | Self::AnonArray(items)
            | Self::AnonHash(items)
            | Self::AnonSub(items)
            | Self::Call { args: items, .. }
            | Self::Do(items)
            | Self::Block(items) => items.iter().collect(),
            Self::Command(inner)
            | Self::Deref { target: inner, .. }
            | Self::Return(Some(inner))
            | Self::Scalar(inner)
            | Self::Unary { operand: inner, .. }
            | Self::Postfix { operand: inner, .. }
            | Self::Declare { target: inner, .. } => vec![&**inner],
            Self::Index { base, index, .. } => vec![&**base, &**index],
            Self::Invoke { target, args }
            | Self::MethodCall {
                invocant: target,
                args,
                ..
            } => std::iter::once(&**target).chain(args).collect(),
            Self::Print { handle, args, .. } => handle.iter().map(|h| &**h).chain(args).collect(),
            Self::Binary { left, right, .. } => vec![&**left, &**right],
            Self::Assign { target, value, .. } => vec![&**target, &**value],
            Self::Ternary {
                condition,
                then,
                otherwise,
            } => vec![&**condition, &**then, &**otherwise],
            Self::If {
                branches,
                otherwise,
                ..
            } => branches
                .iter()
                .flat_map(|branch| std::iter::once(&branch.condition).chain(&branch.body))
                .chain(otherwise.iter().flatten())
                .collect(),
            Self::While {
                condition, body, ..
            } => std::iter::once(&**condition).chain(body).collect(),
            Self::Foreach {
                variable,
                list,
                body,
            } => variable
                .iter()
                .map(|v| &**v)
                .chain(std::iter::once(&**list))
                .chain(body)
                .collect(),
            Self::SubDecl { body, .. } => body.iter().flatten().collect(),
            Self::Modified {
                condition,
                statement,
                ..
            } => vec![&**statement, &**condition],
        }
    }

    /// Heredoc occurrences in this subtree.
    #[must_use]
    pub fn heredoc_count(&self) -> usize {
        match self {
            Self::Heredoc(doc) => 1 + doc.borrow().content.as_ref().map_or(0, Self::heredoc_count),
            _ => self.children().into_iter().map(Self::heredoc_count).sum(),
        }
    }
}
