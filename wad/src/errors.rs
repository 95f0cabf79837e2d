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
    #[fail(display = "Corrupt level: {}", _0)]
    CorruptLevel(String),

    #[fail(display = "Bad WAD name: {}", _0)]
    BadName(String),
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }

    pub(crate) fn invalid_byte_in_wad_name(byte: u8, bytes: &[u8]) -> Self {
        Self::from(ErrorKind::BadName(format!(
            "Invalid character `{}` in wad name `{}`.",
            char::from(byte),
            String::from_utf8_lossy(bytes),
        )))
    }

    pub(crate) fn wad_name_too_long(bytes: &[u8]) -> Self {
        Self::from(ErrorKind::BadName(format!(
            "Wad name too long `{}`.",
            String::from_utf8_lossy(bytes)
        )))
    }

    pub(crate) fn dangling_reference(
        table: &'static str,
        index: usize,
        field: &'static str,
        value: i64,
        target_len: usize,
    ) -> Self {
        Self::from(ErrorKind::CorruptLevel(format!(
            "{}[{}].{} = {} is out of range (len={})",
            table, index, field, value, target_len
        )))
    }

    pub(crate) fn missing_right_side(linedef_index: usize) -> Self {
        Self::from(ErrorKind::CorruptLevel(format!(
            "linedefs[{}] has no right sidedef",
            linedef_index
        )))
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
