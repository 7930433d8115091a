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
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Organizations::ShortName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Organizations::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
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
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Departments::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Departments::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Departments::ShortName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Departments::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Departments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departments_organization")
                            .from(Departments::Table, Departments::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Positions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Positions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Positions::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Positions::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employees::DepartmentId).uuid().not_null())
                    .col(
                        ColumnDef::new(Employees::EmployeeNumber)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Employees::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(Employees::ShortName).string_len(100).not_null())
                    .col(ColumnDef::new(Employees::DateOfBirth).date().not_null())
                    .col(
                        ColumnDef::new(Employees::UnionTicketNumber)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Employees::UnionJoinDate).date().not_null())
                    .col(
                        ColumnDef::new(Employees::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Employees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Employees::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_department")
                            .from(Employees::Table, Employees::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employees_department")
                    .table(Employees::Table)
                    .col(Employees::DepartmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmploymentHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmploymentHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EmploymentHistory::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(EmploymentHistory::PositionId).uuid().not_null())
                    .col(
                        ColumnDef::new(EmploymentHistory::AppointmentDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmploymentHistory::Rate)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmploymentHistory::IsMainPosition)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EmploymentHistory::EmploymentStartDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmploymentHistory::EmploymentEndDate).date().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employment_history_employee")
                            .from(EmploymentHistory::Table, EmploymentHistory::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employment_history_position")
                            .from(EmploymentHistory::Table, EmploymentHistory::PositionId)
                            .to(Positions::Table, Positions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employment_history_employee_date")
                    .table(EmploymentHistory::Table)
                    .col(EmploymentHistory::EmployeeId)
                    .col(EmploymentHistory::AppointmentDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmploymentHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Positions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    ShortName,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    OrganizationId,
    Name,
    ShortName,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Positions {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    DepartmentId,
    EmployeeNumber,
    FullName,
    ShortName,
    DateOfBirth,
    UnionTicketNumber,
    UnionJoinDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EmploymentHistory {
    Table,
    Id,
    EmployeeId,
    PositionId,
    AppointmentDate,
    Rate,
    IsMainPosition,
    EmploymentStartDate,
    EmploymentEndDate,
}
