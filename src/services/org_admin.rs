//! Organisation-admin console
//!
//! Access to an organisation is granted to super admins and to users with an
//! `organisation_admins` row for it. Group-scoped operations always derive the
//! organisation from the group itself.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::error::{AppError, Result};
use crate::middleware::rbac::is_super_admin;
use crate::models::prelude::*;
use crate::models::{group, organisation, organisation_admin, user};
use crate::schemas::{ConsoleOrganisation, GroupConsole, GroupResponse, InviteResponse};
use crate::services::invites::list_invites;
use crate::services::join_links::get_active_join_link;
use crate::services::organisations::{list_groups, list_organisations};

/// Organisations the user administers, newest first
pub async fn admin_organisations<C: ConnectionTrait>(
    db: &C,
    admin: &user::Model,
) -> Result<Vec<organisation::Model>> {
    if is_super_admin(admin.role) {
        return list_organisations(db).await;
    }

    let org_ids: Vec<i64> = OrganisationAdmin::find()
        .filter(organisation_admin::Column::UserId.eq(admin.id))
        .all(db)
        .await?
        .into_iter()
        .map(|assignment| assignment.organisation_id)
        .collect();

    if org_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(Organisation::find()
        .filter(organisation::Column::Id.is_in(org_ids))
        .order_by_desc(organisation::Column::CreatedAt)
        .order_by_desc(organisation::Column::Id)
        .all(db)
        .await?)
}

pub async fn is_admin_of_organisation<C: ConnectionTrait>(
    db: &C,
    admin: &user::Model,
    organisation_id: i64,
) -> Result<bool> {
    if is_super_admin(admin.role) {
        return Ok(true);
    }

    let assignment = OrganisationAdmin::find()
        .filter(organisation_admin::Column::UserId.eq(admin.id))
        .filter(organisation_admin::Column::OrganisationId.eq(organisation_id))
        .one(db)
        .await?;
    Ok(assignment.is_some())
}

pub async fn ensure_organisation_access<C: ConnectionTrait>(
    db: &C,
    admin: &user::Model,
    organisation_id: i64,
) -> Result<()> {
    if is_admin_of_organisation(db, admin, organisation_id).await? {
        Ok(())
    } else {
        tracing::warn!(user_id = admin.id, organisation_id, "Organisation access denied");
        Err(AppError::Forbidden(
            "Not authorised for this organisation".to_string(),
        ))
    }
}

/// Load a group and its organisation, checking the caller administers it
pub async fn load_managed_group<C: ConnectionTrait>(
    db: &C,
    admin: &user::Model,
    group_id: i64,
) -> Result<(organisation::Model, group::Model)> {
    let found = Group::find_by_id(group_id)
        .find_also_related(Organisation)
        .one(db)
        .await?;

    let (group, org) = match found {
        Some((group, Some(org))) => (group, org),
        _ => return Err(AppError::NotFound("Group not found".to_string())),
    };

    ensure_organisation_access(db, admin, org.id).await?;
    Ok((org, group))
}

/// Landing view: every administered organisation with its groups
pub async fn console<C: ConnectionTrait>(
    db: &C,
    admin: &user::Model,
) -> Result<Vec<ConsoleOrganisation>> {
    let mut result = Vec::new();
    for org in admin_organisations(db, admin).await? {
        let groups = list_groups(db, org.id).await?;
        result.push(ConsoleOrganisation {
            organisation: org.into(),
            groups: groups.into_iter().map(GroupResponse::from).collect(),
        });
    }
    Ok(result)
}

pub async fn group_console<C: ConnectionTrait>(
    db: &C,
    admin: &user::Model,
    group_id: i64,
) -> Result<GroupConsole> {
    let (org, group) = load_managed_group(db, admin, group_id).await?;
    let invites = list_invites(db, group.id).await?;
    let active_join_link = get_active_join_link(db, group.id).await?;

    Ok(GroupConsole {
        organisation: org.into(),
        group: group.into(),
        invites: invites.into_iter().map(InviteResponse::from).collect(),
        active_join_link: active_join_link.map(Into::into),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::services::organisations::assign_admin;
    use crate::test_helpers::{create_test_db, create_test_group, create_test_org, create_test_user};

    #[tokio::test]
    async fn test_super_admin_sees_every_organisation() {
        let db = create_test_db().await;
        let root = create_test_user(&db, "root@example.com", UserRole::SuperAdmin).await;
        create_test_org(&db, "Acme").await;
        create_test_org(&db, "Globex").await;

        assert_eq!(admin_organisations(&db, &root).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_organisation_admin_sees_assigned_only() {
        let db = create_test_db().await;
        let acme = create_test_org(&db, "Acme").await;
        let globex = create_test_org(&db, "Globex").await;
        let ada = create_test_user(&db, "ada@example.com", UserRole::OrganisationAdmin).await;
        assign_admin(&db, acme.id, "ada@example.com").await.unwrap();

        let orgs = admin_organisations(&db, &ada).await.unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].id, acme.id);

        assert!(is_admin_of_organisation(&db, &ada, acme.id).await.unwrap());
        assert!(!is_admin_of_organisation(&db, &ada, globex.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_group_access_follows_the_group_organisation() {
        let db = create_test_db().await;
        let acme = create_test_org(&db, "Acme").await;
        let globex = create_test_org(&db, "Globex").await;
        let ada = create_test_user(&db, "ada@example.com", UserRole::OrganisationAdmin).await;
        assign_admin(&db, acme.id, "ada@example.com").await.unwrap();

        let own = create_test_group(&db, acme.id, "Founders").await;
        let foreign = create_test_group(&db, globex.id, "Rivals").await;

        let console = group_console(&db, &ada, own.id).await.unwrap();
        assert_eq!(console.organisation.id, acme.id);
        assert!(console.invites.is_empty());
        assert!(console.active_join_link.is_none());

        assert!(matches!(
            group_console(&db, &ada, foreign.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            group_console(&db, &ada, 999).await,
            Err(AppError::NotFound(_))
        ));
    }
}
