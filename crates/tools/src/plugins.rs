//! Host-tool plugins registered by this configuration.

use std::fmt;

/// A plugin package the host build tool loads before reading the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plugin {
    /// npm package name
    pub package: &'static str,
    /// What the plugin adds to the host tool
    pub provides: &'static str,
}

/// Registration order matters to the host tool.
pub const PLUGINS: [Plugin; 3] = [
    Plugin {
        package: "@nomiclabs/hardhat-ethers",
        provides: "ethers.js bindings",
    },
    Plugin {
        package: "@nomiclabs/hardhat-etherscan",
        provides: "contract verification",
    },
    Plugin {
        package: "@openzeppelin/hardhat-upgrades",
        provides: "upgradeable proxy deployment",
    },
];

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.package, self.provides)
    }
}
