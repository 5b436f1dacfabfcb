//! The household roster.
//!
//! Members are fixed configuration, not user data: events can only be
//! assigned to someone listed here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A household member events can be assigned to.
///
/// The default member is who new events go to unless someone else is picked.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Member {
    Daura,
    Dani,
    #[default]
    Liam,
    Maya,
    Milo,
}

/// Display attributes for a member.
#[derive(Debug, Clone, Serialize)]
pub struct MemberProfile {
    pub member: Member,
    pub name: &'static str,
    /// Accent color used for the member's events and avatar ring
    pub color: &'static str,
    pub avatar: &'static str,
}

pub static ROSTER: [MemberProfile; 5] = [
    MemberProfile {
        member: Member::Daura,
        name: "Daura",
        color: "rose",
        avatar: "/avatars/daura.png",
    },
    MemberProfile {
        member: Member::Dani,
        name: "Dani",
        color: "amber",
        avatar: "/avatars/dani.png",
    },
    MemberProfile {
        member: Member::Liam,
        name: "Liam",
        color: "sky",
        avatar: "/avatars/liam.png",
    },
    MemberProfile {
        member: Member::Maya,
        name: "Maya",
        color: "purple",
        avatar: "/avatars/maya.png",
    },
    MemberProfile {
        member: Member::Milo,
        name: "Milo",
        color: "emerald",
        avatar: "/avatars/milo.png",
    },
];

impl Member {
    pub const ALL: [Member; 5] = [
        Member::Daura,
        Member::Dani,
        Member::Liam,
        Member::Maya,
        Member::Milo,
    ];

    pub fn profile(&self) -> &'static MemberProfile {
        // ROSTER is declared in the same order as the enum
        &ROSTER[*self as usize]
    }

    pub fn name(&self) -> &'static str {
        self.profile().name
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Member {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Member::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("Unknown household member '{}'", s))
    }
}
