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
                    .table(Votings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Votings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Votings::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Votings::Description).text().not_null())
                    .col(ColumnDef::new(Votings::Kind).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Votings::VoteType)
                            .string_len(20)
                            .not_null()
                            .default("single"),
                    )
                    .col(
                        ColumnDef::new(Votings::Status)
                            .string_len(20)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Votings::AuthorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Votings::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Votings::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Votings::QuorumRequired).decimal_len(5, 2).null())
                    .col(
                        ColumnDef::new(Votings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Votings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Votings::EndDate).gte(Expr::col(Votings::StartDate)))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VoteOptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VoteOptions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(VoteOptions::VotingId).uuid().not_null())
                    .col(ColumnDef::new(VoteOptions::Text).string_len(255).not_null())
                    .col(ColumnDef::new(VoteOptions::Order).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_options_voting")
                            .from(VoteOptions::Table, VoteOptions::VotingId)
                            .to(Votings::Table, Votings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VotingAudiences::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VotingAudiences::VotingId).uuid().not_null())
                    .col(ColumnDef::new(VotingAudiences::DepartmentId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_voting_audiences")
                            .col(VotingAudiences::VotingId)
                            .col(VotingAudiences::DepartmentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voting_audiences_voting")
                            .from(VotingAudiences::Table, VotingAudiences::VotingId)
                            .to(Votings::Table, Votings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_voting_audiences_department")
                            .from(VotingAudiences::Table, VotingAudiences::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Votes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Votes::VotingId).uuid().not_null())
                    .col(ColumnDef::new(Votes::VoterId).uuid().not_null())
                    .col(
                        ColumnDef::new(Votes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_voting")
                            .from(Votes::Table, Votes::VotingId)
                            .to(Votings::Table, Votings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_voter")
                            .from(Votes::Table, Votes::VoterId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One ballot per voter per voting, regardless of application checks.
        manager
            .create_index(
                Index::create()
                    .name("uq_votes_voting_voter")
                    .table(Votes::Table)
                    .col(Votes::VotingId)
                    .col(Votes::VoterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VoteSelections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VoteSelections::VoteId).uuid().not_null())
                    .col(ColumnDef::new(VoteSelections::OptionId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_vote_selections")
                            .col(VoteSelections::VoteId)
                            .col(VoteSelections::OptionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_selections_vote")
                            .from(VoteSelections::Table, VoteSelections::VoteId)
                            .to(Votes::Table, Votes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_selections_option")
                            .from(VoteSelections::Table, VoteSelections::OptionId)
                            .to(VoteOptions::Table, VoteOptions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuorumVotingResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuorumVotingResults::VotingId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(QuorumVotingResults::QuorumPercentage)
                            .decimal_len(5, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuorumVotingResults::TotalVoters)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuorumVotingResults::RequiredVoters)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuorumVotingResults::IsQuorumReached)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuorumVotingResults::DecisionMade)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuorumVotingResults::DecisionDescription)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(QuorumVotingResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quorum_results_voting")
                            .from(QuorumVotingResults::Table, QuorumVotingResults::VotingId)
                            .to(Votings::Table, Votings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QuorumVotingResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VoteSelections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VotingAudiences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VoteOptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Votings::Table).to_owned())
            .await?;
        Ok(())
    }
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
enum Votings {
    Table,
    Id,
    Title,
    Description,
    Kind,
    VoteType,
    Status,
    AuthorId,
    StartDate,
    EndDate,
    QuorumRequired,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VoteOptions {
    Table,
    Id,
    VotingId,
    Text,
    Order,
}

#[derive(DeriveIden)]
enum VotingAudiences {
    Table,
    VotingId,
    DepartmentId,
}

#[derive(DeriveIden)]
enum Votes {
    Table,
    Id,
    VotingId,
    VoterId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VoteSelections {
    Table,
    VoteId,
    OptionId,
}

#[derive(DeriveIden)]
enum QuorumVotingResults {
    Table,
    VotingId,
    QuorumPercentage,
    TotalVoters,
    RequiredVoters,
    IsQuorumReached,
    DecisionMade,
    DecisionDescription,
    CreatedAt,
}
