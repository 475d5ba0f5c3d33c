use std::fmt;

/// Host operating system family, as far as package management is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    MacLike,
    LinuxLike,
    WindowsLike,
    Unknown,
}

impl PlatformFamily {
    /// Family of the host this binary was built for.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an `std::env::consts::OS` style name to a family.
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" | "ios" => Self::MacLike,
            "linux" | "android" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => {
                Self::LinuxLike
            }
            "windows" => Self::WindowsLike,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_mac_like(self) -> bool {
        self == Self::MacLike
    }

    #[must_use]
    pub fn is_linux_like(self) -> bool {
        self == Self::LinuxLike
    }

    #[must_use]
    pub fn is_windows_like(self) -> bool {
        self == Self::WindowsLike
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::MacLike => "macOS",
            Self::LinuxLike => "Linux",
            Self::WindowsLike => "Windows",
            Self::Unknown => "unknown platform",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
