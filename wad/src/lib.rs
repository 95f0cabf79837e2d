mod errors;
mod level;
mod name;

pub mod types;
pub mod util;

pub use self::errors::{Error, ErrorKind, Result};
pub use self::level::Level;
pub use self::name::WadName;
