use crate::GuestError;
use std::{fmt, str::FromStr};

/// Operating system of the host running the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    /// Linux.
    Linux,
    /// macOS.
    MacOs,
    /// iOS.
    Ios,
    /// FreeBSD.
    FreeBsd,
    /// DragonFly BSD.
    DragonFly,
    /// NetBSD.
    NetBsd,
    /// OpenBSD.
    OpenBsd,
    /// Solaris.
    Solaris,
    /// Android.
    Android,
    /// Windows.
    Windows,
}

impl HostOs {
    /// Every known host, in no particular order.
    pub const ALL: [Self; 10] = [
        Self::Linux,
        Self::MacOs,
        Self::Ios,
        Self::FreeBsd,
        Self::DragonFly,
        Self::NetBsd,
        Self::OpenBsd,
        Self::Solaris,
        Self::Android,
        Self::Windows,
    ];

    /// The name the host reports, matching [`std::env::consts::OS`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Ios => "ios",
            Self::FreeBsd => "freebsd",
            Self::DragonFly => "dragonfly",
            Self::NetBsd => "netbsd",
            Self::OpenBsd => "openbsd",
            Self::Solaris => "solaris",
            Self::Android => "android",
            Self::Windows => "windows",
        }
    }

    /// Returns `true` for the unix-like hosts.
    pub const fn is_unix(self) -> bool {
        !matches!(self, Self::Windows)
    }
}

impl FromStr for HostOs {
    type Err = GuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|os| os.as_str() == s)
            .ok_or_else(|| GuestError::UnknownHostOs(s.to_owned()))
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
