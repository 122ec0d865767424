//! The `.jqs` file format: a gzip stream around delimiter-separated text.
//!
//! There is no self-describing structure. Reader and writer agree on field
//! order, and every list is preceded by its length. See `writer.rs` for the
//! exact token sequence.

pub mod index;
mod reader;
pub mod resource;
pub mod token;
pub mod version;
mod writer;

use crate::libjqs::error::{CorruptFileError, JqsError, Result};
use crate::libjqs::pool::QuestionPool;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, error, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

pub use resource::{DirectoryResources, EmbeddedResources, ResourceLoader, BUILTIN, DEMO_POOL};
pub use version::{FormatVersion, FILE_FORMAT_VERSION};

/// Writes `pool` to `path`, optionally only its marked questions.
///
/// The file is written in place; a failure part way leaves it truncated.
pub fn save(pool: &QuestionPool, path: impl AsRef<Path>, marked_only: bool) -> Result<()> {
    let path = path.as_ref();
    let now = Instant::now();
    let result = File::create(path)
        .map_err(JqsError::from)
        .and_then(|file| write_pool(pool, BufWriter::new(file), marked_only))
        .and_then(|out| out.into_inner().map_err(|err| JqsError::Io(err.into_error())))
        .and_then(|file| file.sync_all().map_err(JqsError::from));
    match result {
        Ok(()) => {
            info!(
                "[Codec] Saved {:?} in {} ms.",
                path,
                now.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!("[Codec] Error while saving {:?}: {}", path, err);
            Err(err)
        }
    }
}

/// Reads a pool from `path`. The result is a new pool; nothing is merged.
pub fn load(path: impl AsRef<Path>) -> Result<QuestionPool> {
    let path = path.as_ref();
    let now = Instant::now();
    let result = File::open(path)
        .map_err(JqsError::from)
        .and_then(|file| read_pool(BufReader::new(file)));
    match result {
        Ok(pool) => {
            info!(
                "[Codec] Loaded {} questions from {:?} in {} ms.",
                pool.len(),
                path,
                now.elapsed().as_millis()
            );
            Ok(pool)
        }
        Err(err) => {
            error!("[Codec] Error while loading {:?}: {}", path, err);
            Err(err)
        }
    }
}

/// Reads a pool shipped as a named resource, such as the bundled demo.
pub fn load_resource(name: &str, loader: &dyn ResourceLoader) -> Result<QuestionPool> {
    let result = loader.open(name).and_then(read_pool);
    match result {
        Ok(pool) => {
            info!(
                "[Codec] Loaded {} questions from resource `{}`.",
                pool.len(),
                name
            );
            Ok(pool)
        }
        Err(err) => {
            error!("[Codec] Error while loading resource `{}`: {}", name, err);
            Err(err)
        }
    }
}

/// Compresses the token stream for `pool` into `out` and hands `out` back
/// once the gzip trailer has been written.
pub fn write_pool<W: Write>(pool: &QuestionPool, out: W, marked_only: bool) -> Result<W> {
    let mut encoder = GzEncoder::new(out, Compression::default());
    let written = writer::write_payload(pool, &mut encoder, marked_only)?;
    let mut out = encoder.finish()?;
    out.flush()?;
    debug!("[Codec] Compressed {} questions.", written);
    Ok(out)
}

pub fn read_pool<R: Read>(input: R) -> Result<QuestionPool> {
    let mut bytes = Vec::new();
    GzDecoder::new(input).read_to_end(&mut bytes)?;
    debug!("[Codec] Decompressed {} bytes.", bytes.len());
    let payload = String::from_utf8(bytes).map_err(|_| CorruptFileError::InvalidUtf8)?;
    decode(&payload)
}

/// The uncompressed token stream, mostly useful for inspection and tests.
pub fn encode(pool: &QuestionPool, marked_only: bool) -> String {
    let mut out = Vec::new();
    // Vec<u8> never fails to write, and the writer only emits UTF-8.
    let _ = writer::write_payload(pool, &mut out, marked_only);
    String::from_utf8_lossy(&out).into_owned()
}

pub fn decode(payload: &str) -> Result<QuestionPool> {
    reader::read_payload(payload)
}
