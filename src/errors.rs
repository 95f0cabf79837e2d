use failure::{Backtrace, Context, Fail};
use std::fmt;
use std::result::Result as StdResult;

pub type Result<T> = StdResult<T, Error>;

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "Partition line of node {} has zero length.", node)]
    DegeneratePartition { node: usize },

    #[fail(display = "Node {} references missing child {:#06x}.", node, child)]
    BadChild { node: usize, child: u16 },

    #[fail(display = "Node {} is reachable more than once from the root.", node)]
    NotATree { node: usize },

    #[fail(display = "Level has neither nodes nor subsectors.")]
    EmptyTree,

    #[fail(display = "Loop {} is part of a containment cycle.", loop_id)]
    ContainmentCycle { loop_id: usize },

    #[fail(display = "Boundary left {} edges unclosed.", edges)]
    OpenBoundary { edges: usize },

    #[fail(display = "No bridge from hole loop {} to its outer loop.", hole)]
    NoBridge { hole: usize },

    #[fail(display = "No ear found with {} vertices remaining.", remaining)]
    Triangulation { remaining: usize },

    #[fail(display = "Query point is not finite.")]
    InvalidQuery,

    #[fail(display = "Invalid build config: {}", _0)]
    Config(String),

    #[fail(display = "Bad level tables: {}", _0)]
    Wad(String),
}

impl ErrorKind {
    /// Errors which only cost the level one surface; the build continues past them.
    pub fn is_malformed_geometry(&self) -> bool {
        match *self {
            ErrorKind::OpenBoundary { .. }
            | ErrorKind::NoBridge { .. }
            | ErrorKind::Triangulation { .. } => true,
            _ => false,
        }
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::from(Context::new(kind))
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Self {
        Error { inner }
    }
}

impl From<wad::Error> for Error {
    fn from(error: wad::Error) -> Self {
        let message = error.to_string();
        Self::from(error.context(ErrorKind::Wad(message)))
    }
}

/// A recovered failure, tagged with the sector whose surface it cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub sector: usize,
    pub kind: ErrorKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sector {}: {}", self.sector, self.kind)
    }
}
