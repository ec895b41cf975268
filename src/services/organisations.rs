//! Organisation management for super admins

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{group, organisation, organisation_admin, UserRole};
use crate::schemas::{
    CreateGroup, CreateOrganisation, GroupResponse, OrganisationAdminResponse, OrganisationDetail,
};
use crate::services::users::{find_user_by_email, set_user_role};

/// Trim a free-text field, mapping blank to `None`
pub fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// URL slug for an organisation name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        }
    }

    if slug.is_empty() {
        "organisation".to_string()
    } else {
        slug
    }
}

/// All organisations, newest first
pub async fn list_organisations<C: ConnectionTrait>(db: &C) -> Result<Vec<organisation::Model>> {
    Ok(Organisation::find()
        .order_by_desc(organisation::Column::CreatedAt)
        .order_by_desc(organisation::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_organisation<C: ConnectionTrait>(db: &C, id: i64) -> Result<organisation::Model> {
    Organisation::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organisation not found".to_string()))
}

pub async fn create_organisation<C: ConnectionTrait>(
    db: &C,
    request: &CreateOrganisation,
) -> Result<organisation::Model> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Organisation name is required".to_string()));
    }

    let mut slug = slugify(name);
    let taken = Organisation::find()
        .filter(organisation::Column::Slug.eq(&slug))
        .one(db)
        .await?
        .is_some();
    if taken {
        slug = format!("{}-{}", slug, Utc::now().timestamp_millis());
    }

    let now = Utc::now();
    let org = organisation::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug),
        description: Set(clean_optional(request.description.as_deref())),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = org.insert(db).await.map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("An organisation with this slug already exists".to_string())
        }
        _ => AppError::Database(err),
    })?;

    tracing::info!(organisation_id = created.id, slug = %created.slug, "Organisation created");
    Ok(created)
}

/// Groups of an organisation, newest first
pub async fn list_groups<C: ConnectionTrait>(
    db: &C,
    organisation_id: i64,
) -> Result<Vec<group::Model>> {
    Ok(Group::find()
        .filter(group::Column::OrganisationId.eq(organisation_id))
        .order_by_desc(group::Column::CreatedAt)
        .order_by_desc(group::Column::Id)
        .all(db)
        .await?)
}

pub async fn organisation_detail<C: ConnectionTrait>(db: &C, id: i64) -> Result<OrganisationDetail> {
    let org = get_organisation(db, id).await?;
    let groups = list_groups(db, org.id).await?;

    let admins = org
        .find_related(OrganisationAdmin)
        .order_by_asc(organisation_admin::Column::AssignedAt)
        .find_also_related(User)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(assignment, admin)| {
            admin.map(|admin| OrganisationAdminResponse {
                user_id: admin.id,
                email: admin.email,
                full_name: admin.full_name,
                assigned_at: assignment.assigned_at,
            })
        })
        .collect();

    Ok(OrganisationDetail {
        organisation: org.into(),
        groups: groups.into_iter().map(GroupResponse::from).collect(),
        admins,
    })
}

pub async fn create_group<C: ConnectionTrait>(
    db: &C,
    organisation_id: i64,
    request: &CreateGroup,
) -> Result<group::Model> {
    let org = get_organisation(db, organisation_id).await?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Group name is required".to_string()));
    }

    let now = Utc::now();
    let new_group = group::ActiveModel {
        organisation_id: Set(org.id),
        name: Set(name.to_string()),
        description: Set(clean_optional(request.description.as_deref())),
        group_type: Set(request.group_type),
        audience_description: Set(clean_optional(request.audience_description.as_deref())),
        cadence: Set(request.cadence),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = new_group.insert(db).await?;

    tracing::info!(group_id = created.id, organisation_id = org.id, "Group created");
    Ok(created)
}

/// Make a user an admin of an organisation, promoting plain users
pub async fn assign_admin<C: ConnectionTrait>(
    db: &C,
    organisation_id: i64,
    email: &str,
) -> Result<organisation_admin::Model> {
    let org = get_organisation(db, organisation_id).await?;
    let target = find_user_by_email(db, email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let user_id = target.id;

    if target.role == UserRole::User {
        set_user_role(db, target, UserRole::OrganisationAdmin).await?;
        tracing::info!(user_id, "User promoted to organisation admin");
    }

    let existing = OrganisationAdmin::find()
        .filter(organisation_admin::Column::UserId.eq(user_id))
        .filter(organisation_admin::Column::OrganisationId.eq(org.id))
        .one(db)
        .await?;
    if let Some(existing) = existing {
        return Ok(existing);
    }

    let assignment = organisation_admin::ActiveModel {
        user_id: Set(user_id),
        organisation_id: Set(org.id),
        assigned_at: Set(Utc::now()),
        ..Default::default()
    };

    match assignment.insert(db).await {
        Ok(created) => {
            tracing::info!(user_id, organisation_id = org.id, "Organisation admin assigned");
            Ok(created)
        }
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => OrganisationAdmin::find()
                .filter(organisation_admin::Column::UserId.eq(user_id))
                .filter(organisation_admin::Column::OrganisationId.eq(org.id))
                .one(db)
                .await?
                .ok_or_else(|| AppError::Internal("Admin assignment vanished".to_string())),
            _ => Err(AppError::Database(err)),
        },
    }
}

pub async fn remove_admin<C: ConnectionTrait>(
    db: &C,
    organisation_id: i64,
    user_id: i64,
) -> Result<()> {
    let result = OrganisationAdmin::delete_many()
        .filter(organisation_admin::Column::UserId.eq(user_id))
        .filter(organisation_admin::Column::OrganisationId.eq(organisation_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Organisation admin not found".to_string()));
    }

    tracing::info!(user_id, organisation_id, "Organisation admin removed");
    Ok(())
}
