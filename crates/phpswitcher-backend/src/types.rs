use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A PHP release line as typed by the user: `X.Y` or `X.Y.Z`.
///
/// Package names are always derived from [`PhpVersion::series`]; the patch
/// component is kept only so it can be echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhpVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}

impl PhpVersion {
    #[must_use]
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: None,
        }
    }

    #[must_use]
    pub fn with_patch(mut self, patch: u32) -> Self {
        self.patch = Some(patch);
        self
    }

    /// Parse a version accepted by `install`: `X.Y` or `X.Y.Z`.
    ///
    /// The input must be exactly `\d+\.\d+(\.\d+)?`; surrounding whitespace is
    /// not stripped.
    ///
    /// # Errors
    /// Returns an error if the input is not two or three dot-separated
    /// decimal components, or if a component does not fit in a `u32`.
    pub fn parse_install(input: &str) -> Result<Self, VersionParseError> {
        let parts: Vec<&str> = input.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(VersionParseError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let mut values = [0_u32; 3];
        for (index, part) in parts.iter().enumerate() {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionParseError::InvalidFormat {
                    input: input.to_string(),
                });
            }
            values[index] = part
                .parse()
                .map_err(|_| VersionParseError::InvalidComponent {
                    component: VersionComponent::ALL[index],
                    value: (*part).to_string(),
                })?;
        }

        Ok(Self {
            major: values[0],
            minor: values[1],
            patch: (parts.len() == 3).then_some(values[2]),
        })
    }

    /// Parse a version accepted by `use`: strictly `X.Y`.
    ///
    /// # Errors
    /// Returns an error for anything [`PhpVersion::parse_install`] rejects and
    /// for inputs that carry a patch component.
    pub fn parse_series(input: &str) -> Result<Self, VersionParseError> {
        let version = Self::parse_install(input)?;
        if version.patch.is_some() {
            return Err(VersionParseError::PatchNotAllowed {
                input: input.to_string(),
            });
        }
        Ok(version)
    }

    /// The `X.Y` release line this version belongs to.
    #[must_use]
    pub fn series(&self) -> Self {
        Self::new(self.major, self.minor)
    }
}

impl Ord for PhpVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
    }
}

impl PartialOrd for PhpVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PhpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{patch}", self.major, self.minor),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

impl FromStr for PhpVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_install(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Patch,
}

impl VersionComponent {
    const ALL: [Self; 3] = [Self::Major, Self::Minor, Self::Patch];
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Invalid version format: '{input}' (expected X.Y or X.Y.Z)")]
    InvalidFormat { input: String },
    #[error("Invalid version format: '{input}' (expected X.Y without a patch component)")]
    PatchNotAllowed { input: String },
    #[error("Invalid {component} version: {value}")]
    InvalidComponent {
        component: VersionComponent,
        value: String,
    },
}

/// The backend-specific package that provides a PHP release line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub package_name: String,
    pub version: PhpVersion,
}

impl ResolvedPackage {
    #[must_use]
    pub fn new(package_name: impl Into<String>, version: PhpVersion) -> Self {
        Self {
            package_name: package_name.into(),
            version: version.series(),
        }
    }

    /// Canonical `X.Y` string of the resolved release line.
    #[must_use]
    pub fn full_version(&self) -> String {
        self.version.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub package_name: String,
    pub version: PhpVersion,
}

/// Result of a best-effort sibling deactivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlinkOutcome {
    Unlinked,
    AlreadyUnlinked,
    FailedIgnored { reason: String },
}

impl fmt::Display for UnlinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlinked => write!(f, "unlinked"),
            Self::AlreadyUnlinked => write!(f, "already unlinked"),
            Self::FailedIgnored { reason } => write!(f, "unlink failed (ignored): {reason}"),
        }
    }
}
