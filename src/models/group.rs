use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of group an organisation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    #[sea_orm(string_value = "organisation_connection")]
    OrganisationConnection,
    #[sea_orm(string_value = "cohort_blitz")]
    CohortBlitz,
    #[sea_orm(string_value = "event")]
    Event,
}

impl GroupType {
    pub fn label(&self) -> &'static str {
        match self {
            GroupType::OrganisationConnection => "Organisation Connection",
            GroupType::CohortBlitz => "Cohort Blitz",
            GroupType::Event => "Event",
        }
    }
}

impl Default for GroupType {
    fn default() -> Self {
        GroupType::OrganisationConnection
    }
}

/// How often a group meets
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[sea_orm(string_value = "daily")]
    Daily,
    #[sea_orm(string_value = "every_2_days")]
    #[serde(rename = "every_2_days")]
    Every2Days,
    #[sea_orm(string_value = "every_3_days")]
    #[serde(rename = "every_3_days")]
    Every3Days,
    #[sea_orm(string_value = "weekly")]
    Weekly,
    #[sea_orm(string_value = "fortnightly")]
    Fortnightly,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    #[sea_orm(string_value = "one_time")]
    OneTime,
}

impl Cadence {
    pub fn label(&self) -> &'static str {
        match self {
            Cadence::Daily => "Daily",
            Cadence::Every2Days => "Every 2 Days",
            Cadence::Every3Days => "Every 3 Days",
            Cadence::Weekly => "Weekly",
            Cadence::Fortnightly => "Fortnightly",
            Cadence::Monthly => "Monthly",
            Cadence::Quarterly => "Quarterly",
            Cadence::OneTime => "One-time",
        }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Cadence::Weekly
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub organisation_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub group_type: GroupType,
    pub audience_description: Option<String>,
    pub cadence: Cadence,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organisation::Entity",
        from = "Column::OrganisationId",
        to = "super::organisation::Column::Id",
        on_delete = "Cascade"
    )]
    Organisation,
    #[sea_orm(has_many = "super::group_member::Entity")]
    Members,
    #[sea_orm(has_many = "super::invite::Entity")]
    Invites,
    #[sea_orm(has_many = "super::join_link::Entity")]
    JoinLinks,
}

impl Related<super::organisation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organisation.def()
    }
}

impl Related<super::group_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::invite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invites.def()
    }
}

impl Related<super::join_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JoinLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
