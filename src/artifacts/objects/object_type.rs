use crate::errors::{Error, Result};
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Commit => "commit",
        }
    }

    /// Consume the `<type> <size>\0` header and return the declared type and size
    pub fn parse_header(data_reader: &mut impl BufRead, id: &str) -> Result<(ObjectType, usize)> {
        let mut object_type = Vec::new();
        data_reader
            .read_until(b' ', &mut object_type)
            .map_err(|e| Error::corrupt(id, format!("unreadable header: {e}")))?;
        let object_type = String::from_utf8_lossy(&object_type);
        let object_type = ObjectType::try_from(object_type.trim())
            .map_err(|_| Error::corrupt(id, format!("unknown object type '{}'", object_type.trim())))?;

        let mut size = Vec::new();
        data_reader
            .read_until(b'\0', &mut size)
            .map_err(|e| Error::corrupt(id, format!("unreadable header: {e}")))?;
        let size = String::from_utf8_lossy(&size)
            .trim_end_matches('\0')
            .parse::<usize>()
            .map_err(|_| Error::corrupt(id, "invalid object size"))?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = ();

    fn try_from(value: &str) -> std::result::Result<Self, ()> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
