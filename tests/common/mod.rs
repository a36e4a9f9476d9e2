#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `content` to `dir/name` and return the path.
pub fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Gzip `content` into `dir/name`.
pub fn write_gzip(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

/// A logger export: two lines of preamble, then a header and three rows.
pub const LOGGER_EXPORT: &str = "\
Device: bench logger
Exported 2024-05-01
Time,Voltage,Current,Note
0,1.0,0.5,1
1,1.5,0.6,ok
2,2.0,0.7,end
";

/// Semicolon-delimited file with different casing and one extra column.
pub const SEMICOLON_EXPORT: &str = "\
time;voltage;Temp
0;5;20
1;6;21
";
