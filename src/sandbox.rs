//! # Path Sandbox
//!
//! Every path a tool touches goes through here first. A candidate is accepted only if its
//! canonical form is equal to, or a path-segment descendant of, one of the permitted roots.
//!
//! Resolution rules:
//! - A literal `..` segment is rejected before any filesystem access.
//! - Absolute candidates are canonicalized (symlinks resolved for the existing prefix,
//!   the missing tail re-appended) and checked against the roots.
//! - Relative candidates are joined to each permitted root in turn; the first root under
//!   which the joined path exists wins. A relative path that exists nowhere is rejected.
//! - Containment uses [`Path::starts_with`], which compares whole components, so
//!   `/media/movies-backup` is never inside `/media/movies`.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::domain::config::LibraryConfig;

/// Which configured folder a root is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Movies,
    Shows,
    /// The scan folder new media is picked up from.
    Source,
}

impl RootKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootKind::Movies => "movies",
            RootKind::Shows => "shows",
            RootKind::Source => "source",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "movies" | "movie" => Some(RootKind::Movies),
            "shows" | "show" | "tv" => Some(RootKind::Shows),
            "source" => Some(RootKind::Source),
            _ => None,
        }
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roots that may receive writes (copy and move destinations).
pub const LIBRARY_ROOTS: &[RootKind] = &[RootKind::Movies, RootKind::Shows];

/// Every root, in resolution order.
pub const ALL_ROOTS: &[RootKind] = &[RootKind::Movies, RootKind::Shows, RootKind::Source];

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("path is empty")]
    EmptyPath,
    #[error("path contains invalid directory traversal: {0}")]
    Traversal(String),
    #[error("path is not within permitted folders: {0}")]
    OutsideRoots(String),
    #[error("relative path '{0}' does not exist under any permitted folder; use an absolute path")]
    UnresolvedRelative(String),
    #[error("the {0} folder is not configured")]
    RootNotConfigured(RootKind),
    #[error("failed to resolve {path}: {source}")]
    Unresolvable {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("required library folder '{0}' is not configured")]
    MissingRoot(RootKind),
    #[error("{kind} folder {path} is not a usable directory: {reason}")]
    InvalidRoot {
        kind: RootKind,
        path: PathBuf,
        reason: String,
    },
}

/// Immutable set of canonical permitted roots, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct PathSandbox {
    roots: Vec<(RootKind, PathBuf)>,
}

impl PathSandbox {
    /// Canonicalizes each root. Every root must be an existing directory.
    pub fn new(roots: impl IntoIterator<Item = (RootKind, PathBuf)>) -> Result<Self, SandboxError> {
        let mut canonical = Vec::new();
        for (kind, path) in roots {
            let resolved = fs::canonicalize(&path).map_err(|e| SandboxError::InvalidRoot {
                kind,
                path: path.clone(),
                reason: e.to_string(),
            })?;
            if !resolved.is_dir() {
                return Err(SandboxError::InvalidRoot {
                    kind,
                    path,
                    reason: "not a directory".to_string(),
                });
            }
            canonical.push((kind, resolved));
        }
        Ok(Self { roots: canonical })
    }

    /// Builds the sandbox from configuration. Movies and shows are required.
    pub fn from_config(library: &LibraryConfig) -> Result<Self, SandboxError> {
        let movies = library
            .movies
            .clone()
            .ok_or(SandboxError::MissingRoot(RootKind::Movies))?;
        let shows = library
            .shows
            .clone()
            .ok_or(SandboxError::MissingRoot(RootKind::Shows))?;

        let mut roots = vec![(RootKind::Movies, movies), (RootKind::Shows, shows)];
        if let Some(source) = &library.source {
            roots.push((RootKind::Source, source.clone()));
        }
        Self::new(roots)
    }

    pub fn root(&self, kind: RootKind) -> Option<&Path> {
        self.roots
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.as_path())
    }

    pub fn roots(&self) -> impl Iterator<Item = (RootKind, &Path)> {
        self.roots.iter().map(|(k, p)| (*k, p.as_path()))
    }

    /// Resolves a candidate against every permitted root.
    pub fn resolve(&self, candidate: &str) -> Result<PathBuf, SandboxError> {
        self.resolve_in(candidate, ALL_ROOTS)
    }

    /// Resolves a candidate that will be written to: only library roots qualify.
    pub fn resolve_destination(&self, candidate: &str) -> Result<PathBuf, SandboxError> {
        self.resolve_in(candidate, LIBRARY_ROOTS)
    }

    /// Resolves a candidate against the given subset of roots.
    pub fn resolve_in(&self, candidate: &str, kinds: &[RootKind]) -> Result<PathBuf, SandboxError> {
        let path = lexical_check(candidate)?;

        if path.is_absolute() {
            let resolved = canonicalize_lenient(&path)?;
            return if self.is_contained(&resolved, kinds) {
                Ok(resolved)
            } else {
                Err(SandboxError::OutsideRoots(candidate.to_string()))
            };
        }

        for (_, root) in self.roots.iter().filter(|(k, _)| kinds.contains(k)) {
            let joined = root.join(&path);
            if fs::symlink_metadata(&joined).is_err() {
                continue;
            }
            let resolved = canonicalize_lenient(&joined)?;
            // A symlink under the root may still point elsewhere.
            if self.is_contained(&resolved, kinds) {
                return Ok(resolved);
            }
            return Err(SandboxError::OutsideRoots(candidate.to_string()));
        }

        Err(SandboxError::UnresolvedRelative(candidate.to_string()))
    }

    /// Resolves `subpath` inside one specific root; an empty subpath is the root itself.
    pub fn resolve_under(&self, kind: RootKind, subpath: &str) -> Result<PathBuf, SandboxError> {
        let root = self.root(kind).ok_or(SandboxError::RootNotConfigured(kind))?;
        if subpath.trim().is_empty() {
            return Ok(root.to_path_buf());
        }

        let path = lexical_check(subpath)?;
        if path.is_absolute() {
            return self.resolve_in(subpath, &[kind]);
        }

        let resolved = canonicalize_lenient(&root.join(&path))?;
        if resolved.starts_with(root) {
            Ok(resolved)
        } else {
            Err(SandboxError::OutsideRoots(subpath.to_string()))
        }
    }

    fn is_contained(&self, path: &Path, kinds: &[RootKind]) -> bool {
        self.roots
            .iter()
            .filter(|(k, _)| kinds.contains(k))
            .any(|(_, root)| path.starts_with(root))
    }
}

/// Pure checks done before touching the filesystem. Returns the path with `.` segments
/// dropped.
fn lexical_check(candidate: &str) -> Result<PathBuf, SandboxError> {
    if candidate.trim().is_empty() {
        return Err(SandboxError::EmptyPath);
    }

    let path = Path::new(candidate);
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(SandboxError::Traversal(candidate.to_string()));
    }

    Ok(path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

/// Canonicalizes the longest existing prefix of an absolute path and re-appends the rest.
/// The path must already be free of `..` segments.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf, SandboxError> {
    let unresolvable = |source: io::Error| SandboxError::Unresolvable {
        path: path.display().to_string(),
        source,
    };

    let mut existing = path;
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        match fs::symlink_metadata(existing) {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let (Some(name), Some(parent)) = (existing.file_name(), existing.parent()) else {
                    return Err(unresolvable(e));
                };
                missing.push(name.to_owned());
                existing = parent;
            }
            Err(e) => return Err(unresolvable(e)),
        }
    }

    // Fails for dangling symlinks, which could otherwise be written through.
    let mut resolved = fs::canonicalize(existing).map_err(unresolvable)?;
    for part in missing.iter().rev() {
        resolved.push(part);
    }
    Ok(resolved)
}
