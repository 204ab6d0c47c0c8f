//! Image membership records.

use serde::{Deserialize, Serialize};

/// A tenant granted access to an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMember {
    /// Member (tenant) identifier.
    pub member_id: String,

    /// Whether the member may share the image further.
    #[serde(default)]
    pub can_share: bool,
}

impl ImageMember {
    /// Creates a membership entry.
    #[must_use]
    pub fn new(member_id: impl Into<String>, can_share: bool) -> Self {
        Self {
            member_id: member_id.into(),
            can_share,
        }
    }
}

/// An image shared with a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedImage {
    /// Image identifier.
    pub image_id: String,

    /// Whether the member may share the image further.
    #[serde(default)]
    pub can_share: bool,
}

/// Full replacement set for an image's membership list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberData {
    /// The complete membership list.
    pub memberships: Vec<ImageMember>,
}

impl MemberData {
    /// Creates a replacement set from the given members.
    #[must_use]
    pub const fn new(memberships: Vec<ImageMember>) -> Self {
        Self { memberships }
    }
}

impl FromIterator<ImageMember> for MemberData {
    fn from_iter<I: IntoIterator<Item = ImageMember>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
