use crate::libjqs::error::{JqsError, Result};
use log::debug;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Something that can hand out named, compressed pool files.
pub trait ResourceLoader {
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>>;
}

/// Pools compiled into the binary.
pub struct EmbeddedResources {
    entries: &'static [(&'static str, &'static [u8])],
}

impl EmbeddedResources {
    pub const fn new(entries: &'static [(&'static str, &'static [u8])]) -> Self {
        EmbeddedResources { entries }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl ResourceLoader for EmbeddedResources {
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, bytes)| Box::new(*bytes) as Box<dyn Read>)
            .ok_or_else(|| JqsError::ResourceNotFound(name.to_string()))
    }
}

/// Name of the demo pool in [`BUILTIN`].
pub const DEMO_POOL: &str = "demo.jqs";

/// Resources shipped with every build.
pub static BUILTIN: EmbeddedResources =
    EmbeddedResources::new(&[(DEMO_POOL, include_bytes!("../../../demos/demo.jqs"))]);

/// Resources looked up as relative paths under a directory.
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryResources { root: root.into() }
    }
}

impl ResourceLoader for DirectoryResources {
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>> {
        let relative = Path::new(name);
        let stays_inside = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if name.is_empty() || !stays_inside {
            debug!("[Codec] Refusing resource name {:?}.", name);
            return Err(JqsError::ResourceNotFound(name.to_string()));
        }
        match File::open(self.root.join(relative)) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(JqsError::ResourceNotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
