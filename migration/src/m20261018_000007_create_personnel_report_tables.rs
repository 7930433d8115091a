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
                    .table(MembershipReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MembershipReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MembershipReports::Title).string_len(255).not_null())
                    .col(ColumnDef::new(MembershipReports::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(MembershipReports::PeriodStart).date().not_null())
                    .col(ColumnDef::new(MembershipReports::PeriodEnd).date().not_null())
                    .col(ColumnDef::new(MembershipReports::TotalMembers).integer().not_null())
                    .col(ColumnDef::new(MembershipReports::NewMembers).integer().not_null())
                    .col(ColumnDef::new(MembershipReports::LeftMembers).integer().not_null())
                    .col(
                        ColumnDef::new(MembershipReports::MembershipRate)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MembershipReports::Content).text().not_null())
                    .col(ColumnDef::new(MembershipReports::GeneratedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(MembershipReports::GeneratedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_reports_organization")
                            .from(MembershipReports::Table, MembershipReports::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovementReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MovementReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MovementReports::Title).string_len(255).not_null())
                    .col(ColumnDef::new(MovementReports::DepartmentId).uuid().not_null())
                    .col(ColumnDef::new(MovementReports::PeriodStart).date().not_null())
                    .col(ColumnDef::new(MovementReports::PeriodEnd).date().not_null())
                    .col(ColumnDef::new(MovementReports::Content).text().not_null())
                    .col(ColumnDef::new(MovementReports::GeneratedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(MovementReports::GeneratedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movement_reports_department")
                            .from(MovementReports::Table, MovementReports::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovementReportEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MovementReportEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MovementReportEntries::ReportId).uuid().not_null())
                    .col(ColumnDef::new(MovementReportEntries::EmployeeId).uuid().not_null())
                    .col(
                        ColumnDef::new(MovementReportEntries::Movement)
                            .string_len(10)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movement_report_entries_report")
                            .from(MovementReportEntries::Table, MovementReportEntries::ReportId)
                            .to(MovementReports::Table, MovementReports::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movement_report_entries_employee")
                            .from(MovementReportEntries::Table, MovementReportEntries::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_movement_report_entries")
                    .table(MovementReportEntries::Table)
                    .col(MovementReportEntries::ReportId)
                    .col(MovementReportEntries::EmployeeId)
                    .col(MovementReportEntries::Movement)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MovementReportEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MovementReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MembershipReports::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum MembershipReports {
    Table,
    Id,
    Title,
    OrganizationId,
    PeriodStart,
    PeriodEnd,
    TotalMembers,
    NewMembers,
    LeftMembers,
    MembershipRate,
    Content,
    GeneratedBy,
    GeneratedAt,
}

#[derive(DeriveIden)]
enum MovementReports {
    Table,
    Id,
    Title,
    DepartmentId,
    PeriodStart,
    PeriodEnd,
    Content,
    GeneratedBy,
    GeneratedAt,
}

#[derive(DeriveIden)]
enum MovementReportEntries {
    Table,
    Id,
    ReportId,
    EmployeeId,
    Movement,
}
