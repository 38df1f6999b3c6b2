//! Template input.

use crate::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Read the whole template, from `path` if given and from `stdin` otherwise.
pub fn read_template(path: Option<&Path>, mut stdin: impl Read) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut buf = Vec::new();
            stdin.read_to_end(&mut buf).map_err(Error::StdinRead)?;
            Ok(buf)
        }
    }
}
