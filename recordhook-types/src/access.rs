//! Sharing masks carried by GrantAccess / ModifyAccess.

use crate::EntityReference;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// Bit mask of access rights, wire-compatible with the platform's numeric flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessRights(u32);

impl AccessRights {
    pub const NONE: Self = Self(0);
    pub const READ: Self = Self(1);
    pub const WRITE: Self = Self(2);
    pub const APPEND: Self = Self(4);
    pub const APPEND_TO: Self = Self(16);
    pub const CREATE: Self = Self(32);
    pub const DELETE: Self = Self(65_536);
    pub const SHARE: Self = Self(262_144);
    pub const ASSIGN: Self = Self(524_288);

    const NAMED: [(Self, &'static str); 8] = [
        (Self::READ, "Read"),
        (Self::WRITE, "Write"),
        (Self::APPEND, "Append"),
        (Self::APPEND_TO, "AppendTo"),
        (Self::CREATE, "Create"),
        (Self::DELETE, "Delete"),
        (Self::SHARE, "Share"),
        (Self::ASSIGN, "Assign"),
    ];

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the set flags, in ascending bit order.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for AccessRights {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccessRights {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for AccessRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        f.write_str(&self.names().join("|"))
    }
}

impl FromStr for AccessRights {
    type Err = crate::Error;

    /// Parses `Read|Write` style masks (case-insensitive, `Access` suffix optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mask = Self::NONE;
        for part in s.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            let bare = part
                .strip_suffix("Access")
                .unwrap_or(part)
                .to_ascii_lowercase();
            if bare == "none" {
                continue;
            }
            let flag = Self::NAMED
                .iter()
                .find(|(_, name)| name.to_ascii_lowercase() == bare)
                .map(|(flag, _)| *flag)
                .ok_or_else(|| crate::Error::UnknownAccessRight(part.to_string()))?;
            mask |= flag;
        }
        Ok(mask)
    }
}

/// A principal (user or team) together with the rights granted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalAccess {
    pub principal: EntityReference,
    pub access_mask: AccessRights,
}

impl PrincipalAccess {
    #[must_use]
    pub fn new(principal: EntityReference, access_mask: AccessRights) -> Self {
        Self {
            principal,
            access_mask,
        }
    }
}
