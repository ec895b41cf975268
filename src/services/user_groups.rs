//! Group membership from the member's side

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{group_member, organisation, MemberStatus};
use crate::schemas::UserGroup;

/// Whether the user holds an active membership in the group
pub async fn is_active_member<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
    user_id: i64,
) -> Result<bool> {
    let membership = GroupMember::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .filter(group_member::Column::UserId.eq(user_id))
        .filter(group_member::Column::Status.eq(MemberStatus::Active))
        .one(db)
        .await?;
    Ok(membership.is_some())
}

/// Add the user to the group, re-activating an earlier membership if there is one
pub async fn ensure_membership<C: ConnectionTrait>(
    db: &C,
    group_id: i64,
    user_id: i64,
) -> Result<group_member::Model> {
    let existing = GroupMember::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .filter(group_member::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    match existing {
        Some(membership) if membership.status == MemberStatus::Active => Ok(membership),
        Some(membership) => {
            let mut active: group_member::ActiveModel = membership.into();
            active.status = Set(MemberStatus::Active);
            active.joined_at = Set(Utc::now());
            active.left_at = Set(None);
            let updated = active.update(db).await?;
            tracing::info!(group_id, user_id, "Group membership re-activated");
            Ok(updated)
        }
        None => {
            let membership = group_member::ActiveModel {
                group_id: Set(group_id),
                user_id: Set(user_id),
                status: Set(MemberStatus::Active),
                joined_at: Set(Utc::now()),
                left_at: Set(None),
                ..Default::default()
            };
            let created = membership.insert(db).await?;
            tracing::info!(group_id, user_id, "User added to group");
            Ok(created)
        }
    }
}

/// Groups the user is an active member of, newest membership first
pub async fn get_user_groups<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<Vec<UserGroup>> {
    let memberships = GroupMember::find()
        .filter(group_member::Column::UserId.eq(user_id))
        .filter(group_member::Column::Status.eq(MemberStatus::Active))
        .order_by_desc(group_member::Column::JoinedAt)
        .find_also_related(Group)
        .all(db)
        .await?;

    let org_ids: Vec<i64> = memberships
        .iter()
        .filter_map(|(_, group)| group.as_ref().map(|g| g.organisation_id))
        .collect();

    let org_names: HashMap<i64, String> = if org_ids.is_empty() {
        HashMap::new()
    } else {
        Organisation::find()
            .filter(organisation::Column::Id.is_in(org_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|org| (org.id, org.name))
            .collect()
    };

    Ok(memberships
        .into_iter()
        .filter_map(|(membership, group)| {
            let group = group?;
            Some(UserGroup {
                group_id: group.id,
                organisation_name: org_names
                    .get(&group.organisation_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                name: group.name,
                description: group.description,
                group_type: group.group_type,
                cadence: group.cadence,
                organisation_id: group.organisation_id,
                joined_at: membership.joined_at,
            })
        })
        .collect())
}

/// Opt the user out of a group
pub async fn leave_group<C: ConnectionTrait>(db: &C, user_id: i64, group_id: i64) -> Result<()> {
    let membership = GroupMember::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .filter(group_member::Column::UserId.eq(user_id))
        .filter(group_member::Column::Status.eq(MemberStatus::Active))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;

    let mut active: group_member::ActiveModel = membership.into();
    active.status = Set(MemberStatus::OptedOut);
    active.left_at = Set(Some(Utc::now()));
    active.update(db).await?;

    tracing::info!(group_id, user_id, "User left group");
    Ok(())
}
