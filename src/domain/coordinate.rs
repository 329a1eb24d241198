//! Credential coordinates and composite identifiers.
//!
//! A credential is addressed by `folder → domain → id`. Two string forms are
//! derived from that triple:
//!
//! - the **resource id**, `folder/name` (or just `name` at the root), which is
//!   the identity a declarative caller persists;
//! - the **import id**, `[<folder>/]<domain>/<name>`, which is what a user types
//!   to adopt an existing credential and which [`CredentialCoordinate::parse`]
//!   reads back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

/// Domain used when none is declared (Jenkins' global domain).
pub const DEFAULT_DOMAIN: &str = "_";

/// Normalize a folder path: drop leading, trailing and repeated separators.
///
/// The root folder normalizes to `""`.
pub fn normalize_folder(raw: &str) -> String {
    raw.split('/').filter(|segment| !segment.is_empty()).collect::<Vec<_>>().join("/")
}

/// Store URL form of a folder: `teamA/sub` becomes `job/teamA/job/sub`.
pub fn folder_api_path(folder: &str) -> String {
    folder
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("job/{}", segment))
        .collect::<Vec<_>>()
        .join("/")
}

/// Resource id for a credential: `folder/name`, or `name` at the root.
pub fn resource_id(folder: &str, name: &str) -> String {
    let folder = normalize_folder(folder);
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Location of one credential in the store.
///
/// Invariants: `name` and `domain` are non-empty, `folder` is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialCoordinate {
    folder: String,
    domain: String,
    name: String,
}

impl CredentialCoordinate {
    /// Build a coordinate from declared values.
    ///
    /// An empty `domain` falls back to [`DEFAULT_DOMAIN`].
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when `name` is empty.
    pub fn new(folder: &str, domain: &str, name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::validation_field("credential name cannot be empty", "name"));
        }
        if name.contains('/') {
            return Err(Error::validation_field(
                format!("credential name '{}' cannot contain '/'", name),
                "name",
            ));
        }

        let domain = if domain.is_empty() { DEFAULT_DOMAIN } else { domain };

        Ok(Self {
            folder: normalize_folder(folder),
            domain: domain.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse an import id of the form `[<folder>/]<domain>/<name>`.
    ///
    /// The last segment is the name, the one before it the domain, and
    /// everything in front of those forms the folder.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] when fewer than two segments are present or the
    /// domain or name segment is empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let segments: Vec<&str> = raw.split('/').collect();
        if segments.len() < 2 {
            return Err(Error::format(raw));
        }

        let name = segments[segments.len() - 1];
        let domain = segments[segments.len() - 2];
        if name.is_empty() || domain.is_empty() {
            return Err(Error::format(raw));
        }

        let folder = segments[..segments.len() - 2].join("/");
        Self::new(folder.trim_matches('/'), domain, name)
    }

    /// Normalized folder (`""` for the root).
    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Credential id within the folder and domain.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity persisted by declarative callers.
    pub fn resource_id(&self) -> String {
        resource_id(&self.folder, &self.name)
    }

    /// Identifier accepted by [`CredentialCoordinate::parse`].
    pub fn import_id(&self) -> String {
        if self.folder.is_empty() {
            format!("{}/{}", self.domain, self.name)
        } else {
            format!("{}/{}/{}", self.folder, self.domain, self.name)
        }
    }
}

impl fmt::Display for CredentialCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.import_id())
    }
}

impl FromStr for CredentialCoordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
