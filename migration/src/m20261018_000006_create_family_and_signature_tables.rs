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
                    .table(Children::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Children::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Children::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Children::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(Children::DateOfBirth).date().not_null())
                    .col(
                        ColumnDef::new(Children::DisabilityStatus)
                            .string_len(20)
                            .not_null()
                            .default("none"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_children_employee")
                            .from(Children::Table, Children::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentSignatures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentSignatures::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentSignatures::DocumentType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocumentSignatures::DocumentId).uuid().not_null())
                    .col(ColumnDef::new(DocumentSignatures::SignerId).uuid().not_null())
                    .col(
                        ColumnDef::new(DocumentSignatures::SignatureHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentSignatures::SignedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DocumentSignatures::IpAddress)
                            .string_len(45)
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_signatures_signer")
                            .from(DocumentSignatures::Table, DocumentSignatures::SignerId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A member signs a given document once.
        manager
            .create_index(
                Index::create()
                    .name("uq_document_signatures_signer")
                    .table(DocumentSignatures::Table)
                    .col(DocumentSignatures::DocumentType)
                    .col(DocumentSignatures::DocumentId)
                    .col(DocumentSignatures::SignerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentSignatures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Children::Table).to_owned())
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
enum Children {
    Table,
    Id,
    EmployeeId,
    FullName,
    DateOfBirth,
    DisabilityStatus,
}

#[derive(DeriveIden)]
enum DocumentSignatures {
    Table,
    Id,
    DocumentType,
    DocumentId,
    SignerId,
    SignatureHash,
    SignedAt,
    IpAddress,
}
