use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meetings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub meeting_type: String,
    #[sea_orm(column_type = "Text")]
    pub agenda: String,
    pub meeting_date: DateTimeWithTimeZone,
    pub location: String,
    pub organizer_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub protocol: String,
    pub is_published: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::meeting_attendee::Entity")]
    MeetingAttendee,
    #[sea_orm(has_many = "super::motivated_opinion::Entity")]
    MotivatedOpinion,
}

impl Related<super::meeting_attendee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeetingAttendee.def()
    }
}

impl Related<super::motivated_opinion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MotivatedOpinion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
