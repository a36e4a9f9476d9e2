//! Upload payloads: reading, decompression and text decoding.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::CompressionFormat;

const UTF8_BOM: &str = "\u{feff}";

/// Raw bytes of one file as received, plus a display name when known.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: Option<String>, bytes: Vec<u8>) -> Self {
        Self { name, bytes }
    }

    /// Read a file, decompressing it when `compression` is given or implied by the extension.
    pub fn from_path(path: &Path, compression: Option<CompressionFormat>) -> LoadResult<Self> {
        let compression = compression.or_else(|| CompressionFormat::from_extension(path));
        let file = File::open(path)?;
        let bytes = read_all(BufReader::new(file), compression)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        Ok(Self { name, bytes })
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn read_all<R: Read + 'static>(
    reader: R,
    compression: Option<CompressionFormat>,
) -> LoadResult<Vec<u8>> {
    let mut reader: Box<dyn Read> = match compression {
        None => Box::new(reader),
        Some(CompressionFormat::Gzip) => Box::new(flate2::read::MultiGzDecoder::new(reader)),
        Some(CompressionFormat::Zstd) => Box::new(zstd::Decoder::new(reader)?),
        Some(CompressionFormat::Bzip2) => Box::new(bzip2::read::BzDecoder::new(reader)),
        Some(CompressionFormat::Xz) => Box::new(xz2::read::XzDecoder::new(reader)),
    };
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| match compression {
        Some(format) => LoadError::Decode(format!(
            "could not decompress {} data: {e}",
            format.extension()
        )),
        None => LoadError::Io(e),
    })?;
    Ok(bytes)
}

/// Interpret an upload as UTF-8 text. A leading byte order mark is dropped.
pub fn decode(upload: &Upload) -> LoadResult<String> {
    if upload.is_empty() {
        return Err(LoadError::EmptyUpload);
    }
    let text = std::str::from_utf8(&upload.bytes)
        .map_err(|e| LoadError::Decode(format!("not valid UTF-8 text ({e})")))?;
    Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string())
}
