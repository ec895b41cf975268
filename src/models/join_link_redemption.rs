use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_join_link_redemptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub join_link_id: i64,
    pub user_id: i64,
    pub redeemed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::join_link::Entity",
        from = "Column::JoinLinkId",
        to = "super::join_link::Column::Id",
        on_delete = "Cascade"
    )]
    JoinLink,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::join_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JoinLink.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
