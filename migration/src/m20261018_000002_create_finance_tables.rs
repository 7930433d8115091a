use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Support requests are never deleted; cancellation is a status value.
        manager
            .create_table(
                Table::create()
                    .table(SupportRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupportRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SupportRequests::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(SupportRequests::RequestorId).uuid().not_null())
                    .col(
                        ColumnDef::new(SupportRequests::Amount)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupportRequests::Reason).string_len(20).not_null())
                    .col(ColumnDef::new(SupportRequests::Description).text().not_null())
                    .col(
                        ColumnDef::new(SupportRequests::Status)
                            .string_len(20)
                            .not_null()
                            .default("created"),
                    )
                    .col(
                        ColumnDef::new(SupportRequests::SupportingDocument)
                            .string_len(512)
                            .null(),
                    )
                    .col(ColumnDef::new(SupportRequests::ApproverId).uuid().null())
                    .col(
                        ColumnDef::new(SupportRequests::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SupportRequests::PaymentDocument)
                            .string_len(512)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SupportRequests::PaidAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(SupportRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SupportRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_requests_employee")
                            .from(SupportRequests::Table, SupportRequests::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .index(
                        Index::create()
                            .name("idx_support_requests_status")
                            .col(SupportRequests::Status)
                            .col(SupportRequests::CreatedAt),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MembershipFees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MembershipFees::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MembershipFees::EmployeeId).uuid().not_null())
                    .col(
                        ColumnDef::new(MembershipFees::Amount)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MembershipFees::PercentageRate)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MembershipFees::Period).date().not_null())
                    .col(
                        ColumnDef::new(MembershipFees::PaidAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(MembershipFees::PaidBy).uuid().null())
                    .col(
                        ColumnDef::new(MembershipFees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MembershipFees::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_fees_employee")
                            .from(MembershipFees::Table, MembershipFees::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_membership_fees_employee_period")
                    .table(MembershipFees::Table)
                    .col(MembershipFees::EmployeeId)
                    .col(MembershipFees::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FinancialRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FinancialRecords::RecordType)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FinancialRecords::Amount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(FinancialRecords::Description).text().not_null())
                    .col(ColumnDef::new(FinancialRecords::RelatedRequestId).uuid().null())
                    .col(ColumnDef::new(FinancialRecords::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(FinancialRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_financial_records_request")
                            .from(FinancialRecords::Table, FinancialRecords::RelatedRequestId)
                            .to(SupportRequests::Table, SupportRequests::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .index(
                        Index::create()
                            .name("idx_financial_records_created")
                            .col(FinancialRecords::CreatedAt),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FinancialReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FinancialReports::Title).string_len(255).not_null())
                    .col(ColumnDef::new(FinancialReports::PeriodStart).date().not_null())
                    .col(ColumnDef::new(FinancialReports::PeriodEnd).date().not_null())
                    .col(ColumnDef::new(FinancialReports::Content).text().not_null())
                    .col(ColumnDef::new(FinancialReports::GeneratedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(FinancialReports::GeneratedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinancialReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FinancialRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MembershipFees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SupportRequests::Table).to_owned())
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
enum SupportRequests {
    Table,
    Id,
    EmployeeId,
    RequestorId,
    Amount,
    Reason,
    Description,
    Status,
    SupportingDocument,
    ApproverId,
    ApprovedAt,
    PaymentDocument,
    PaidAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MembershipFees {
    Table,
    Id,
    EmployeeId,
    Amount,
    PercentageRate,
    Period,
    PaidAt,
    PaidBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FinancialRecords {
    Table,
    Id,
    RecordType,
    Amount,
    Description,
    RelatedRequestId,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FinancialReports {
    Table,
    Id,
    Title,
    PeriodStart,
    PeriodEnd,
    Content,
    GeneratedBy,
    GeneratedAt,
}
