use super::errors::{Error, Result};
use serde::de::{Deserialize, Deserializer, Error as SerdeDeError};
use std::fmt;
use std::ops::Deref;
use std::result::Result as StdResult;
use std::str::FromStr;

/// An eight byte, nul padded, upper-case lump or texture name as stored in level tables.
#[derive(Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Default)]
pub struct WadName([u8; 8]);

impl WadName {
    pub fn from_bytes(value: &[u8]) -> Result<WadName> {
        let mut name = [0u8; 8];
        let mut nulled = false;
        for (dest, &src) in name.iter_mut().zip(value.iter()) {
            let new_byte = match src.to_ascii_uppercase() {
                b @ b'A'..=b'Z'
                | b @ b'0'..=b'9'
                | b @ b'_'
                | b @ b'-'
                | b @ b'['
                | b @ b']'
                | b @ b'%'
                | b @ b'\\' => b,
                b'\0' => {
                    nulled = true;
                    break;
                }
                b => return Err(Error::invalid_byte_in_wad_name(b, value)),
            };
            *dest = new_byte;
        }

        if !nulled && value.len() > 8 {
            return Err(Error::wad_name_too_long(value));
        }
        Ok(WadName(name))
    }

    /// The name without its nul padding.
    pub fn trimmed(&self) -> &[u8] {
        let len = self.0.iter().position(|&byte| byte == 0).unwrap_or(8);
        &self.0[..len]
    }
}

impl FromStr for WadName {
    type Err = Error;
    fn from_str(value: &str) -> Result<WadName> {
        WadName::from_bytes(value.as_bytes())
    }
}

impl fmt::Display for WadName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", String::from_utf8_lossy(self.trimmed()))
    }
}

impl fmt::Debug for WadName {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "WadName({:?})",
            String::from_utf8_lossy(self.trimmed())
        )
    }
}

impl Deref for WadName {
    type Target = [u8; 8];
    fn deref(&self) -> &[u8; 8] {
        &self.0
    }
}

impl PartialEq<[u8; 8]> for WadName {
    fn eq(&self, rhs: &[u8; 8]) -> bool {
        self.deref() == rhs
    }
}

impl<'de> Deserialize<'de> for WadName {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WadName::from_bytes(&<[u8; 8]>::deserialize(deserializer)?).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::WadName;
    use std::str::FromStr;

    #[test]
    fn test_wad_name() {
        assert_eq!(&WadName::from_str("").unwrap(), b"\0\0\0\0\0\0\0\0");
        assert_eq!(&WadName::from_str("f_sky1").unwrap(), b"F_SKY1\0\0");
        assert_eq!(&WadName::from_str("12345678").unwrap(), b"12345678");
        assert_eq!(&WadName::from_str("123\05678").unwrap(), b"123\0\0\0\0\0");
        assert_eq!(&WadName::from_str("-").unwrap(), b"-\0\0\0\0\0\0\0");

        assert!(WadName::from_bytes(b"123456789").is_err());
        assert!(WadName::from_bytes(b"$$ASDF_").is_err());
        assert!(WadName::from_bytes(b"\xff123").is_err());
    }

    #[test]
    fn display_is_trimmed() {
        let name = WadName::from_str("FLOOR4_8").unwrap();
        assert_eq!(name.to_string(), "FLOOR4_8");
        assert_eq!(WadName::from_str("NUKAGE1").unwrap().to_string(), "NUKAGE1");
        assert_eq!(format!("{:?}", WadName::from_str("SKY1").unwrap()), "WadName(\"SKY1\")");
    }
}
