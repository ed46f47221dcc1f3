// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Access-control lists.
//!
//! Bits use ZooKeeper's wire values so they convert one-to-one at the client
//! boundary. Two presets matter to the replicator:
//!
//! - [`Perms::FILE`] (admin, read, write) for data nodes
//! - [`Perms::DIRECTORY`] (admin, create, delete, read, write) for the
//!   placeholder parents created by Recursive-Create

use std::fmt;
use std::ops::BitOr;

/// Permission bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Perms(u32);

impl Perms {
    pub const NONE: Perms = Perms(0);
    pub const READ: Perms = Perms(1);
    pub const WRITE: Perms = Perms(1 << 1);
    pub const CREATE: Perms = Perms(1 << 2);
    pub const DELETE: Perms = Perms(1 << 3);
    pub const ADMIN: Perms = Perms(1 << 4);
    pub const ALL: Perms = Perms(0b1_1111);

    /// Leaf/data node permissions.
    pub const FILE: Perms = Perms(Self::ADMIN.0 | Self::READ.0 | Self::WRITE.0);

    /// Intermediate scaffolding node permissions.
    pub const DIRECTORY: Perms =
        Perms(Self::ADMIN.0 | Self::CREATE.0 | Self::DELETE.0 | Self::READ.0 | Self::WRITE.0);

    /// Build from raw bits, dropping unknown ones.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Perms(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Perms) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Perms {
    type Output = Perms;

    fn bitor(self, rhs: Perms) -> Perms {
        Perms(self.0 | rhs.0)
    }
}

impl fmt::Display for Perms {
    // Same letters as the ZooKeeper CLI `getAcl` output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (Self::CREATE, 'c'),
            (Self::DELETE, 'd'),
            (Self::READ, 'r'),
            (Self::WRITE, 'w'),
            (Self::ADMIN, 'a'),
        ];
        for (perm, c) in flags {
            if self.contains(perm) {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// One `{identity, permissions}` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Acl {
    pub perms: Perms,
    pub scheme: String,
    pub id: String,
}

impl Acl {
    /// `world:anyone` with the given permissions.
    pub fn world(perms: Perms) -> Self {
        Self {
            perms,
            scheme: "world".to_string(),
            id: "anyone".to_string(),
        }
    }
}

impl fmt::Display for Acl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scheme, self.id, self.perms)
    }
}

/// Fully open ACL used for every replicated node.
pub fn open_acl() -> Vec<Acl> {
    vec![Acl::world(Perms::ALL)]
}

/// The same identities with permissions replaced by [`Perms::DIRECTORY`].
pub fn directory_acl(acl: &[Acl]) -> Vec<Acl> {
    acl.iter()
        .map(|entry| Acl {
            perms: Perms::DIRECTORY,
            ..entry.clone()
        })
        .collect()
}
