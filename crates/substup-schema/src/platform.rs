//! Platform identification: the open host space and the closed key space.
//!
//! Release archives exist for a fixed set of `(os, arch)` pairs, while the
//! machine running the installer can be anything. The types here keep the
//! two spaces distinct: [`HostSpec`] describes what we are running on,
//! [`ArtifactKey`] names what can be downloaded, and
//! [`ArtifactKey::for_host`] is the mapping between them. Hosts outside the
//! supported space fail at that mapping, with the host attached to the
//! error, never earlier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Operating system component of an [`ArtifactKey`].
///
/// Serialized with the naming convention used in release archive names
/// (`darwin`, not `macos`). Parsing accepts the common aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Apple's kernel name, used by Go and Rust release tooling.
    Darwin,
    /// Linux-based operating systems.
    Linux,
}

impl Os {
    /// String form as it appears in archive names (`darwin` / `linux`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "darwin" | "macos" | "osx" => Ok(Self::Darwin),
            "linux" => Ok(Self::Linux),
            _ => Err(format!("Unknown operating system: {s}")),
        }
    }
}

/// CPU architecture component of an [`ArtifactKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// ARM 64-bit (Apple Silicon, aarch64 Linux).
    Arm64,
    /// Intel/AMD 64-bit, the Go naming convention.
    Amd64,
    /// ARM 32-bit, as built for Raspberry Pi class hardware.
    Armv6,
}

impl Arch {
    /// String form as it appears in archive names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::Amd64 => "amd64",
            Self::Armv6 => "armv6",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "amd64" | "x86_64" => Ok(Self::Amd64),
            "armv6" => Ok(Self::Armv6),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}

/// A supported `(os, arch)` pair, the unit of catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactKey {
    /// Operating system the artifact was built for.
    pub os: Os,
    /// CPU architecture the artifact was built for.
    pub arch: Arch,
}

impl ArtifactKey {
    /// Create a key from its components.
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Derive the key a host should install, or refuse the host.
    ///
    /// The decision table:
    ///
    /// - macOS: ARM maps to `darwin/arm64`, Intel to `darwin/amd64`.
    ///   Pointer width is ignored; no 32-bit macOS branch exists.
    /// - Linux: ARM splits on pointer width (`linux/arm64` for 64-bit,
    ///   `linux/armv6` for 32-bit); Intel maps to `linux/amd64` on 64-bit
    ///   only. 32-bit Intel Linux has no published artifact.
    /// - Everything else is refused.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnsupportedHost`] carrying the full host
    /// description when no artifact is published for it.
    pub fn for_host(host: &HostSpec) -> Result<Self, ResolveError> {
        match (&host.os, &host.cpu, host.width) {
            (HostOs::Macos, CpuFamily::Arm, _) => Ok(Self::new(Os::Darwin, Arch::Arm64)),
            (HostOs::Macos, CpuFamily::Intel, _) => Ok(Self::new(Os::Darwin, Arch::Amd64)),
            (HostOs::Linux, CpuFamily::Arm, PointerWidth::Bits64) => {
                Ok(Self::new(Os::Linux, Arch::Arm64))
            }
            (HostOs::Linux, CpuFamily::Arm, PointerWidth::Bits32) => {
                Ok(Self::new(Os::Linux, Arch::Armv6))
            }
            (HostOs::Linux, CpuFamily::Intel, PointerWidth::Bits64) => {
                Ok(Self::new(Os::Linux, Arch::Amd64))
            }
            _ => Err(ResolveError::UnsupportedHost {
                os: host.os.clone(),
                cpu: host.cpu.clone(),
                width: host.width,
            }),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Host operating system as reported by the platform.
///
/// Open-ended on purpose: detection never fails, so an unexpected OS can be
/// carried all the way into an error message instead of being flattened to
/// "unknown" at the introspection step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    /// Apple macOS.
    Macos,
    /// Linux-based operating systems.
    Linux,
    /// Microsoft Windows.
    Windows,
    /// Anything else, preserved verbatim for diagnostics.
    Other(String),
}

impl HostOs {
    /// Classify an OS name as reported by `std::env::consts::OS`.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "macos" | "darwin" | "osx" => Self::Macos,
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Macos => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// CPU family, the coarse ARM-vs-Intel split the decision table needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuFamily {
    /// ARM cores of any generation (aarch64, armv6, armv7).
    Arm,
    /// Intel/AMD x86 cores.
    Intel,
    /// Anything else, preserved verbatim for diagnostics.
    Other(String),
}

impl CpuFamily {
    /// Classify an architecture name as reported by `std::env::consts::ARCH`.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "aarch64" | "arm64" | "arm" | "armv6" | "armv7" => Self::Arm,
            "x86_64" | "amd64" | "x86" | "i686" | "i586" | "intel" => Self::Intel,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CpuFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arm => write!(f, "arm"),
            Self::Intel => write!(f, "intel"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Pointer width of the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerWidth {
    /// 32-bit userland.
    Bits32,
    /// 64-bit userland.
    Bits64,
}

impl PointerWidth {
    /// Pointer width of the running binary, from compile-time configuration.
    pub fn detect() -> Self {
        if cfg!(target_pointer_width = "64") {
            Self::Bits64
        } else {
            Self::Bits32
        }
    }

    /// Whether this is a 64-bit host.
    pub fn is_64_bit(self) -> bool {
        matches!(self, Self::Bits64)
    }
}

impl fmt::Display for PointerWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bits32 => write!(f, "32-bit"),
            Self::Bits64 => write!(f, "64-bit"),
        }
    }
}

/// Everything the resolver needs to know about the machine it runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpec {
    /// Host operating system.
    pub os: HostOs,
    /// Host CPU family.
    pub cpu: CpuFamily,
    /// Host pointer width.
    pub width: PointerWidth,
}

impl HostSpec {
    /// Assemble a host description from its components.
    pub const fn new(os: HostOs, cpu: CpuFamily, width: PointerWidth) -> Self {
        Self { os, cpu, width }
    }

    /// Introspect the current machine.
    ///
    /// Never fails: an unrecognized OS or CPU is captured as-is and refused
    /// later by [`ArtifactKey::for_host`], which produces an error message
    /// naming it.
    pub fn detect() -> Self {
        Self {
            os: HostOs::from_name(std::env::consts::OS),
            cpu: CpuFamily::from_name(std::env::consts::ARCH),
            width: PointerWidth::detect(),
        }
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} ({})", self.os, self.cpu, self.width)
    }
}

/// Why resolution refused a host.
///
/// Both variants are permanent for a given machine: retrying cannot help,
/// so callers should report and stop rather than loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The host's OS/CPU/width combination maps to no key at all.
    #[error("unsupported platform: {os} on {cpu} ({width})")]
    UnsupportedHost {
        /// Host operating system that was refused.
        os: HostOs,
        /// Host CPU family that was refused.
        cpu: CpuFamily,
        /// Host pointer width that was refused.
        width: PointerWidth,
    },

    /// The host maps to a key, but the catalog carries no record for it.
    #[error("no artifact published for {key}")]
    MissingArtifact {
        /// The derived key with no catalog entry.
        key: ArtifactKey,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(os: HostOs, cpu: CpuFamily, width: PointerWidth) -> HostSpec {
        HostSpec::new(os, cpu, width)
    }

    #[test]
    fn macos_arm_maps_to_darwin_arm64() {
        let key = ArtifactKey::for_host(&host(
            HostOs::Macos,
            CpuFamily::Arm,
            PointerWidth::Bits64,
        ))
        .unwrap();
        assert_eq!(key, ArtifactKey::new(Os::Darwin, Arch::Arm64));
    }

    #[test]
    fn macos_intel_maps_to_darwin_amd64_regardless_of_width() {
        for width in [PointerWidth::Bits32, PointerWidth::Bits64] {
            let key =
                ArtifactKey::for_host(&host(HostOs::Macos, CpuFamily::Intel, width)).unwrap();
            assert_eq!(key, ArtifactKey::new(Os::Darwin, Arch::Amd64));
        }
    }

    #[test]
    fn linux_arm_splits_on_pointer_width() {
        let wide = ArtifactKey::for_host(&host(
            HostOs::Linux,
            CpuFamily::Arm,
            PointerWidth::Bits64,
        ))
        .unwrap();
        assert_eq!(wide, ArtifactKey::new(Os::Linux, Arch::Arm64));

        let narrow = ArtifactKey::for_host(&host(
            HostOs::Linux,
            CpuFamily::Arm,
            PointerWidth::Bits32,
        ))
        .unwrap();
        assert_eq!(narrow, ArtifactKey::new(Os::Linux, Arch::Armv6));
        assert_ne!(wide, narrow);
    }

    #[test]
    fn linux_intel_64_maps_to_amd64() {
        let key = ArtifactKey::for_host(&host(
            HostOs::Linux,
            CpuFamily::Intel,
            PointerWidth::Bits64,
        ))
        .unwrap();
        assert_eq!(key, ArtifactKey::new(Os::Linux, Arch::Amd64));
    }

    #[test]
    fn linux_intel_32_is_refused() {
        let err = ArtifactKey::for_host(&host(
            HostOs::Linux,
            CpuFamily::Intel,
            PointerWidth::Bits32,
        ))
        .unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedHost { .. }));
    }

    #[test]
    fn windows_is_refused_with_host_in_error() {
        let err = ArtifactKey::for_host(&host(
            HostOs::Windows,
            CpuFamily::Intel,
            PointerWidth::Bits64,
        ))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported platform: windows on intel (64-bit)"
        );
    }

    #[test]
    fn unknown_cpu_is_refused_even_on_linux() {
        let err = ArtifactKey::for_host(&host(
            HostOs::Linux,
            CpuFamily::Other("riscv64".into()),
            PointerWidth::Bits64,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("riscv64"));
    }

    #[test]
    fn host_os_classification() {
        assert_eq!(HostOs::from_name("macos"), HostOs::Macos);
        assert_eq!(HostOs::from_name("darwin"), HostOs::Macos);
        assert_eq!(HostOs::from_name("linux"), HostOs::Linux);
        assert_eq!(HostOs::from_name("windows"), HostOs::Windows);
        assert_eq!(
            HostOs::from_name("freebsd"),
            HostOs::Other("freebsd".into())
        );
    }

    #[test]
    fn cpu_family_classification() {
        assert_eq!(CpuFamily::from_name("aarch64"), CpuFamily::Arm);
        assert_eq!(CpuFamily::from_name("arm"), CpuFamily::Arm);
        assert_eq!(CpuFamily::from_name("armv6"), CpuFamily::Arm);
        assert_eq!(CpuFamily::from_name("x86_64"), CpuFamily::Intel);
        assert_eq!(CpuFamily::from_name("i686"), CpuFamily::Intel);
        assert_eq!(
            CpuFamily::from_name("s390x"),
            CpuFamily::Other("s390x".into())
        );
    }

    #[test]
    fn detect_reflects_build_target() {
        let spec = HostSpec::detect();

        #[cfg(target_os = "linux")]
        assert_eq!(spec.os, HostOs::Linux);

        #[cfg(target_os = "macos")]
        assert_eq!(spec.os, HostOs::Macos);

        #[cfg(target_pointer_width = "64")]
        assert!(spec.width.is_64_bit());
    }

    #[test]
    fn os_and_arch_round_trip_through_strings() {
        for os in [Os::Darwin, Os::Linux] {
            assert_eq!(os.as_str().parse::<Os>().unwrap(), os);
        }
        for arch in [Arch::Arm64, Arch::Amd64, Arch::Armv6] {
            assert_eq!(arch.as_str().parse::<Arch>().unwrap(), arch);
        }
    }

    #[test]
    fn os_parse_accepts_aliases() {
        assert_eq!("macos".parse::<Os>().unwrap(), Os::Darwin);
        assert_eq!("Darwin".parse::<Os>().unwrap(), Os::Darwin);
        assert_eq!("aarch64".parse::<Arch>().unwrap(), Arch::Arm64);
        assert_eq!("x86_64".parse::<Arch>().unwrap(), Arch::Amd64);
        assert!("mips".parse::<Arch>().is_err());
    }

    #[test]
    fn key_display_is_slash_separated() {
        let key = ArtifactKey::new(Os::Linux, Arch::Armv6);
        assert_eq!(key.to_string(), "linux/armv6");
    }
}
