//! Two-pass loading of the tool list.
//!
//! ```text
//! source.open() → EnumerationPass → RegistryBuilder::finalize()
//! source.open() → ResolutionPass  → ToolResolution::apply(&mut registry)
//! ```
//!
//! The second pass never starts when the first one failed.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use scarfconv_config::AppConfig;
use scarfconv_config::tool_list::{DuplicatePolicy, Labels};
use tracing::{debug, info};

use crate::events::{self, EventHandler, StreamError};
use crate::passes::{EnumerationPass, PassError, ResolutionPass, ToolResolution};
use crate::registry::{AttributeRegistry, RegistryBuilder, RegistryError};
use crate::tracker::TrackerError;

/// Errors that abort loading the tool list.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open tool list {origin}: {error}")]
    Open {
        origin: String,
        #[source]
        error: io::Error,
    },

    #[error("failed to read tool list {origin}: {error}")]
    Read {
        origin: String,
        #[source]
        error: serde_json::Error,
    },

    #[error("malformed tool list {origin}: {error}")]
    Syntax {
        origin: String,
        #[source]
        error: serde_json::Error,
    },

    #[error("unsupported tool list layout in {origin}: {error}")]
    Layout {
        origin: String,
        #[source]
        error: TrackerError,
    },

    #[error("invalid tool list {origin}: {error}")]
    Registry {
        origin: String,
        #[source]
        error: RegistryError,
    },
}

/// A tool list that can be read from the beginning more than once.
pub trait ConfigSource {
    type Reader: Read;

    /// Open a fresh reader positioned at the start of the document.
    fn open(&self) -> io::Result<Self::Reader>;

    /// Human-readable origin for logs and errors.
    fn origin(&self) -> String;
}

/// A tool list on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    type Reader = BufReader<File>;

    fn open(&self) -> io::Result<Self::Reader> {
        File::open(&self.path).map(BufReader::new)
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }
}

/// A tool list held in memory.
#[derive(Debug, Clone, Copy)]
pub struct MemorySource<'a> {
    bytes: &'a [u8],
}

impl<'a> MemorySource<'a> {
    pub fn new(json: &'a str) -> Self {
        Self {
            bytes: json.as_bytes(),
        }
    }

    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl<'a> ConfigSource for MemorySource<'a> {
    type Reader = &'a [u8];

    fn open(&self) -> io::Result<Self::Reader> {
        Ok(self.bytes)
    }

    fn origin(&self) -> String {
        "<memory>".to_string()
    }
}

/// The result of both passes.
#[derive(Debug, Clone)]
pub struct LoadedAttributes {
    pub registry: AttributeRegistry,
    pub resolution: ToolResolution,
}

/// Drives the enumeration and resolution passes over a [`ConfigSource`].
#[derive(Debug, Clone, Default)]
pub struct AttributeLoader {
    labels: Labels,
    duplicates: DuplicatePolicy,
}

impl AttributeLoader {
    pub fn new(labels: Labels, duplicates: DuplicatePolicy) -> Self {
        Self { labels, duplicates }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.labels(), config.duplicate_policy())
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Pass 1 into a fresh builder.
    pub fn enumerate<S: ConfigSource>(&self, source: &S) -> Result<RegistryBuilder, LoadError> {
        let mut builder = RegistryBuilder::new(self.duplicates);
        self.enumerate_into(source, &mut builder)?;
        Ok(builder)
    }

    /// Pass 1 into an existing builder. Returns the number of new entries.
    pub fn enumerate_into<S: ConfigSource>(
        &self,
        source: &S,
        builder: &mut RegistryBuilder,
    ) -> Result<usize, LoadError> {
        let mut pass = EnumerationPass::new(self.labels.clone(), builder);
        run(source, &mut pass)?;
        debug!(origin = %source.origin(), inserted = pass.inserted(), "Enumerated default attributes");
        Ok(pass.inserted())
    }

    /// Pass 2 for `tool`. The registry is not needed until the resolution is
    /// applied.
    pub fn resolve<S: ConfigSource>(&self, source: &S, tool: &str) -> Result<ToolResolution, LoadError> {
        let mut pass = ResolutionPass::new(self.labels.clone(), tool);
        run(source, &mut pass)?;
        Ok(pass.finish())
    }

    /// Run both passes and apply the resolution to the sealed registry.
    pub fn load<S: ConfigSource>(&self, source: &S, tool: &str) -> Result<LoadedAttributes, LoadError> {
        let mut registry = self.enumerate(source)?.finalize();
        let resolution = self.resolve(source, tool)?;
        let marked = resolution.apply(&mut registry);

        info!(
            origin = %source.origin(),
            tool,
            class = %resolution.class(),
            valid = marked,
            known = registry.len(),
            "Loaded tool attributes"
        );
        Ok(LoadedAttributes {
            registry,
            resolution,
        })
    }
}

fn run<S, H>(source: &S, handler: &mut H) -> Result<(), LoadError>
where
    S: ConfigSource,
    H: EventHandler<Error = PassError>,
{
    let reader = source.open().map_err(|error| LoadError::Open {
        origin: source.origin(),
        error,
    })?;

    events::stream(reader, handler).map_err(|err| {
        let origin = source.origin();
        match err {
            StreamError::Json(error) if error.is_io() => LoadError::Read { origin, error },
            StreamError::Json(error) => LoadError::Syntax { origin, error },
            StreamError::Handler(PassError::Tracker(error)) => LoadError::Layout { origin, error },
            StreamError::Handler(PassError::Registry(error)) => LoadError::Registry { origin, error },
        }
    })
}

impl fmt::Display for LoadedAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} of {} attributes valid",
            self.resolution.tool(),
            self.resolution.class(),
            self.registry.valid_entries().count(),
            self.registry.len()
        )
    }
}
