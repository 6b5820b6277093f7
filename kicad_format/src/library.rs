//! Footprint library lookup on a search path.
//!
//! A footprint library is a directory called `<library>.pretty` holding one
//! `<module>.kicad_mod` file per footprint. Libraries are looked up in a list
//! of directories, usually taken from the `KISYSMOD` environment variable.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use regex::Regex;
use tracing::{debug, warn};

use crate::KiCadParseError;

/// Environment variable holding the footprint search path
pub const MODULE_SEARCH_PATH: &str = "KISYSMOD";

const LIBRARY_EXTENSION: &str = "pretty";
const MODULE_EXTENSION: &str = "kicad_mod";

#[derive(Debug, PartialEq, Clone, Default)]
pub struct LibraryPath {
    dirs: Vec<PathBuf>,
}

impl LibraryPath {
    pub fn new(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads the search path from [`MODULE_SEARCH_PATH`], separated the way
    /// the platform separates `PATH` entries
    pub fn from_env() -> Result<Self, KiCadParseError> {
        let value =
            std::env::var_os(MODULE_SEARCH_PATH).ok_or(KiCadParseError::MissingLibraryPath)?;

        let libraries = Self::new(std::env::split_paths(&value));
        debug!(dirs = ?libraries.dirs, "resolved footprint search path");

        Ok(libraries)
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// The directory of `library` in the first search directory containing it
    pub fn find_library(&self, library: &str) -> Result<PathBuf, KiCadParseError> {
        let name = format!("{library}.{LIBRARY_EXTENSION}");

        self.dirs
            .iter()
            .map(|dir| dir.join(&name))
            .find(|path| path.is_dir())
            .ok_or_else(|| KiCadParseError::LibraryNotFound(library.to_string()))
    }

    /// The file of `module` in `library`. Search directories are tried in
    /// order, so a library present in several of them is looked up in each.
    pub fn find_module(&self, library: &str, module: &str) -> Result<PathBuf, KiCadParseError> {
        let name = Path::new(&format!("{library}.{LIBRARY_EXTENSION}"))
            .join(format!("{module}.{MODULE_EXTENSION}"));

        self.dirs
            .iter()
            .map(|dir| dir.join(&name))
            .find(|path| path.is_file())
            .ok_or_else(|| KiCadParseError::ModuleNotFound {
                library: library.to_string(),
                module: module.to_string(),
            })
    }

    /// Names of every library on the search path, in search order. Search
    /// directories that cannot be read are skipped.
    pub fn list_libraries(&self) -> Vec<String> {
        let mut libraries = Vec::new();

        for dir in &self.dirs {
            match stems_with_extension(dir, LIBRARY_EXTENSION) {
                Ok(names) => libraries.extend(names),
                Err(e) => warn!("Skipping footprint directory {:?}: {}", dir, e),
            }
        }

        libraries
    }

    /// Names of the modules in `library`, sorted
    pub fn list_modules(&self, library: &str) -> Result<Vec<String>, KiCadParseError> {
        let path = self.find_library(library)?;

        stems_with_extension(&path, MODULE_EXTENSION).map_err(|e| KiCadParseError::io(path, e))
    }

    /// Names of the modules of every library on the search path
    pub fn list_all_modules(&self) -> Result<Vec<String>, KiCadParseError> {
        let mut modules = Vec::new();

        for library in self.list_libraries() {
            modules.extend(self.list_modules(&library)?);
        }

        Ok(modules)
    }

    /// The text of module `module` of `library`
    pub fn read_module(&self, library: &str, module: &str) -> Result<String, KiCadParseError> {
        let path = self.find_module(library, module)?;
        debug!(path = %path.display(), "reading module");

        std::fs::read_to_string(&path).map_err(|e| KiCadParseError::io(path, e))
    }
}

/// The names which match `pattern` at their start
pub fn filter_by_regex<S: AsRef<str>>(
    names: impl IntoIterator<Item = S>,
    pattern: &str,
) -> Result<Vec<S>, KiCadParseError> {
    let regex = Regex::new(&format!("^(?:{pattern})"))?;

    Ok(names
        .into_iter()
        .filter(|name| regex.is_match(name.as_ref()))
        .collect())
}

/// File stems of the entries of `dir` ending in `.{extension}`, sorted
fn stems_with_extension(dir: &Path, extension: &str) -> std::io::Result<Vec<String>> {
    let mut stems = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension() != Some(OsStr::new(extension)) {
            continue;
        }

        if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
            stems.push(stem.to_string());
        }
    }

    stems.sort();
    Ok(stems)
}
