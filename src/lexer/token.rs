/// Source position of a logical line: originating file and 1-based line
/// number of its first physical line.
pub type Position = (String, usize);

/// A single closure invocation as written on a scope header, e.g.
/// `inline :Weapons` becomes `ClosureCall { name: "inline", args: ["Weapons"] }`.
/// Symbol arguments are stored without their leading colon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureCall {
    pub name: String,
    pub args: Vec<String>,
}

/// A classified logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Blank {
        position: Position,
    },
    Comment {
        value: String,
        position: Position,
    },
    /// `[NAME] [:: CLOSURE_LIST]`. The global header `[]` has an empty name.
    Header {
        name: String,
        closures: Vec<ClosureCall>,
        position: Position,
    },
    /// `key = rhs`, `key: TYPE = rhs` or `key := rhs`.
    Item {
        key: String,
        type_tag: Option<String>,
        rhs: String,
        eval_marked: bool,
        position: Position,
    },
    /// A key declared without a value: `key`, `key :TYPE` or `:key`.
    SymbolDecl {
        key: String,
        type_tag: Option<String>,
        position: Position,
    },
}

impl Token {
    pub fn position(&self) -> &Position {
        match self {
            Token::Blank { position } => position,
            Token::Comment { position, .. } => position,
            Token::Header { position, .. } => position,
            Token::Item { position, .. } => position,
            Token::SymbolDecl { position, .. } => position,
        }
    }
}
