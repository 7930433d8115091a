use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Meetings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Meetings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Meetings::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Meetings::MeetingType).string_len(100).not_null())
                    .col(ColumnDef::new(Meetings::Agenda).text().not_null())
                    .col(
                        ColumnDef::new(Meetings::MeetingDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Meetings::Location).string_len(255).not_null())
                    .col(ColumnDef::new(Meetings::OrganizerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Meetings::Protocol)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Meetings::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Meetings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Meetings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MeetingAttendees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MeetingAttendees::MeetingId).uuid().not_null())
                    .col(ColumnDef::new(MeetingAttendees::EmployeeId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_meeting_attendees")
                            .col(MeetingAttendees::MeetingId)
                            .col(MeetingAttendees::EmployeeId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meeting_attendees_meeting")
                            .from(MeetingAttendees::Table, MeetingAttendees::MeetingId)
                            .to(Meetings::Table, Meetings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meeting_attendees_employee")
                            .from(MeetingAttendees::Table, MeetingAttendees::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MotivatedOpinions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MotivatedOpinions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MotivatedOpinions::MeetingId).uuid().not_null())
                    .col(ColumnDef::new(MotivatedOpinions::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(MotivatedOpinions::Title).string_len(255).not_null())
                    .col(ColumnDef::new(MotivatedOpinions::Content).text().not_null())
                    .col(
                        ColumnDef::new(MotivatedOpinions::Status)
                            .string_len(20)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(MotivatedOpinions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MotivatedOpinions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_motivated_opinions_meeting")
                            .from(MotivatedOpinions::Table, MotivatedOpinions::MeetingId)
                            .to(Meetings::Table, Meetings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_motivated_opinions_author")
                            .from(MotivatedOpinions::Table, MotivatedOpinions::AuthorId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MotivatedOpinions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MeetingAttendees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Meetings::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Meetings {
    Table,
    Id,
    Title,
    MeetingType,
    Agenda,
    MeetingDate,
    Location,
    OrganizerId,
    Protocol,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MeetingAttendees {
    Table,
    MeetingId,
    EmployeeId,
}

#[derive(DeriveIden)]
enum MotivatedOpinions {
    Table,
    Id,
    MeetingId,
    AuthorId,
    Title,
    Content,
    Status,
    CreatedAt,
    UpdatedAt,
}
