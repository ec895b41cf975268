pub mod group;
pub mod group_member;
pub mod invite;
pub mod join_link;
pub mod join_link_redemption;
pub mod organisation;
pub mod organisation_admin;
pub mod session;
pub mod user;

pub use group::{Cadence, GroupType};
pub use group_member::MemberStatus;
pub use invite::InviteStatus;
pub use user::UserRole;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::group::{self, Entity as Group};
    pub use super::group_member::{self, Entity as GroupMember};
    pub use super::invite::{self, Entity as Invite};
    pub use super::join_link::{self, Entity as JoinLink};
    pub use super::join_link_redemption::{self, Entity as JoinLinkRedemption};
    pub use super::organisation::{self, Entity as Organisation};
    pub use super::organisation_admin::{self, Entity as OrganisationAdmin};
    pub use super::session::{self, Entity as Session};
    pub use super::user::{self, Entity as User};
}
