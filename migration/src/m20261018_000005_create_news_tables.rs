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
                    .table(NewsCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NewsCategories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NewsCategories::Name)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(NewsCategories::Description)
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
                    .table(NewsPosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(NewsPosts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(NewsPosts::Title).string_len(255).not_null())
                    .col(ColumnDef::new(NewsPosts::Content).text().not_null())
                    .col(ColumnDef::new(NewsPosts::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(NewsPosts::CategoryId).uuid().not_null())
                    .col(
                        ColumnDef::new(NewsPosts::IsPinned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(NewsPosts::PublishedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(NewsPosts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(NewsPosts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_news_posts_category")
                            .from(NewsPosts::Table, NewsPosts::CategoryId)
                            .to(NewsCategories::Table, NewsCategories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_news_posts_listing")
                    .table(NewsPosts::Table)
                    .col(NewsPosts::IsPinned)
                    .col(NewsPosts::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NewsComments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(NewsComments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(NewsComments::PostId).uuid().not_null())
                    .col(ColumnDef::new(NewsComments::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(NewsComments::Content).text().not_null())
                    .col(
                        ColumnDef::new(NewsComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(NewsComments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_news_comments_post")
                            .from(NewsComments::Table, NewsComments::PostId)
                            .to(NewsPosts::Table, NewsPosts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NewsComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NewsPosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NewsCategories::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum NewsCategories {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum NewsPosts {
    Table,
    Id,
    Title,
    Content,
    AuthorId,
    CategoryId,
    IsPinned,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum NewsComments {
    Table,
    Id,
    PostId,
    AuthorId,
    Content,
    CreatedAt,
    UpdatedAt,
}
