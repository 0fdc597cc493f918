/// Fetch Profiles
///
/// Each profile is a consistent User-Agent plus header suite:
/// - `Minimal` → bare client for existence probes
/// - `Windows` → Chrome on Windows, used for direct fetches
/// - `Stealth` → Chrome with the full client-hint suite, used once a site blocks us
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FetchProfile {
    /// Minimal (just User-Agent)
    Minimal,

    /// Chrome on Windows (most popular desktop platform)
    #[default]
    Windows,

    /// Chrome on Windows with every client hint and a warmed cookie session
    Stealth,
}

impl FetchProfile {
    /// Fetch Profile Name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Minimal => "Minimal",
            Self::Windows => "Windows (Chrome)",
            Self::Stealth => "Stealth (Chrome)",
        }
    }
}
