//! Store paths and asset identifiers
//!
//! Provides [`AssetPath`] for folder addressing inside an asset store and
//! [`AssetId`], the stable identifier of one stored asset.

use crate::kind::AssetKind;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Folder path inside an asset store
///
/// Hierarchical structure using `/`-separated segments. The empty path is
/// the store root.
///
/// # Examples
/// - `["Assets", "Exported"]` → `Assets/Exported`
/// - `[]` → `` (store root)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetPath(Vec<String>);

impl AssetPath {
    /// Empty path (store root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Check if path is the store root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Every `(parent, segment)` pair from the root down to this path
    ///
    /// `Assets/A/B` yields `("", "Assets")`, `("Assets", "A")`, `("Assets/A", "B")`.
    /// Used for segment-by-segment folder creation.
    pub fn ancestry(&self) -> impl Iterator<Item = (AssetPath, &str)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(i, seg)| (Self(self.0[..i].to_vec()), seg.as_str()))
    }

    /// Identifier of a file named `file_name` directly inside this folder
    ///
    /// # Errors
    /// Returns error if `file_name` is not a single valid segment
    pub fn file(&self, file_name: &str) -> Result<AssetId, PathError> {
        validate_segment(file_name)?;
        if self.0.is_empty() {
            AssetId::new(file_name)
        } else {
            AssetId::new(format!("{self}/{file_name}"))
        }
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for AssetPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for AssetPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = trimmed
            .split('/')
            .map(|seg| validate_segment(seg).map(|()| seg.to_string()))
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl Default for AssetPath {
    fn default() -> Self {
        Self::root()
    }
}

fn validate_segment(seg: &str) -> Result<(), PathError> {
    if seg.is_empty() {
        Err(PathError::EmptySegment)
    } else if seg == "." || seg == ".." || seg.contains(['/', '\\']) {
        Err(PathError::InvalidSegment(seg.to_string()))
    } else {
        Ok(())
    }
}

/// Stable identifier of a stored asset
///
/// A normalized `/`-separated path such as `Assets/Characters/Hero.model`.
/// Two identifiers are equal iff they denote the same stored content, so
/// `AssetId` is the deduplication key everywhere.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Create identifier from a path string
    ///
    /// A leading `/` is dropped; the remaining segments must be non-empty.
    ///
    /// # Errors
    /// Returns error if the path is empty or has invalid segments
    pub fn new(path: impl AsRef<str>) -> Result<Self, PathError> {
        let path = path.as_ref().trim_start_matches('/');
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        for seg in path.split('/') {
            validate_segment(seg)?;
        }
        Ok(Self(path.to_string()))
    }

    /// Identifier as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final segment (`Hero.model`)
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Base filename with its extension stripped (`Hero`)
    ///
    /// This is the display name used to group dependency closures.
    #[must_use]
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }

    /// Lowercase extension including the dot (`.model`), empty if none
    #[must_use]
    pub fn extension(&self) -> String {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => name[idx..].to_ascii_lowercase(),
            _ => String::new(),
        }
    }

    /// Folder containing this asset
    #[must_use]
    pub fn folder(&self) -> AssetPath {
        match self.0.rfind('/') {
            Some(idx) => AssetPath(self.0[..idx].split('/').map(str::to_string).collect()),
            None => AssetPath::root(),
        }
    }

    /// Asset kind derived from the extension
    #[inline]
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        AssetKind::from_extension(&self.extension())
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssetId {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AssetId {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors related to store paths and identifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Identifier with no segments
    #[error("asset identifier is empty")]
    Empty,

    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Invalid segment
    #[error("invalid segment: {0}")]
    InvalidSegment(String),
}
