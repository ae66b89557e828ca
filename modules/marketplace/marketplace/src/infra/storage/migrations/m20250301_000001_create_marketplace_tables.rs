//! Initial migration for the marketplace tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn uuid_pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().primary_key().to_owned()
}

fn uuid_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn text_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).text().not_null().to_owned()
}

fn timestamp_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid_pk(Users::Id))
                    .col(ColumnDef::new(Users::Name).text())
                    .col(ColumnDef::new(Users::Email).text())
                    .col(text_col(Users::Role))
                    .col(ColumnDef::new(Users::FactoryId).uuid())
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .col(ColumnDef::new(Users::LastSignedIn).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_factory")
                    .table(Users::Table)
                    .col(Users::FactoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Factories::Table)
                    .if_not_exists()
                    .col(uuid_pk(Factories::Id))
                    .col(text_col(Factories::Name))
                    .col(ColumnDef::new(Factories::Description).text())
                    .col(ColumnDef::new(Factories::Location).text())
                    .col(ColumnDef::new(Factories::ContactEmail).text())
                    .col(ColumnDef::new(Factories::ContactPhone).text())
                    .col(
                        ColumnDef::new(Factories::VerificationStatus)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(timestamp_col(Factories::CreatedAt))
                    .col(timestamp_col(Factories::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(uuid_pk(Products::Id))
                    .col(uuid_col(Products::FactoryId))
                    .col(text_col(Products::Name))
                    .col(ColumnDef::new(Products::Description).text())
                    .col(ColumnDef::new(Products::Category).text())
                    .col(ColumnDef::new(Products::PriceMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Products::MinOrderQuantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(timestamp_col(Products::CreatedAt))
                    .col(timestamp_col(Products::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_factory")
                    .table(Products::Table)
                    .col(Products::FactoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Inquiries::Table)
                    .if_not_exists()
                    .col(uuid_pk(Inquiries::Id))
                    .col(uuid_col(Inquiries::BuyerId))
                    .col(uuid_col(Inquiries::FactoryId))
                    .col(text_col(Inquiries::Subject))
                    .col(text_col(Inquiries::Description))
                    .col(text_col(Inquiries::Status))
                    .col(timestamp_col(Inquiries::CreatedAt))
                    .col(timestamp_col(Inquiries::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ForumPosts::Table)
                    .if_not_exists()
                    .col(uuid_pk(ForumPosts::Id))
                    .col(uuid_col(ForumPosts::AuthorId))
                    .col(text_col(ForumPosts::Title))
                    .col(text_col(ForumPosts::Content))
                    .col(ColumnDef::new(ForumPosts::Category).text())
                    .col(text_col(ForumPosts::Tags))
                    .col(timestamp_col(ForumPosts::CreatedAt))
                    .col(timestamp_col(ForumPosts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ForumAnswers::Table)
                    .if_not_exists()
                    .col(uuid_pk(ForumAnswers::Id))
                    .col(uuid_col(ForumAnswers::PostId))
                    .col(uuid_col(ForumAnswers::AuthorId))
                    .col(text_col(ForumAnswers::Content))
                    .col(
                        ColumnDef::new(ForumAnswers::Votes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ForumAnswers::IsBest)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_col(ForumAnswers::CreatedAt))
                    .col(timestamp_col(ForumAnswers::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_forum_answers_post")
                    .table(ForumAnswers::Table)
                    .col(ForumAnswers::PostId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ForumVotes::Table)
                    .if_not_exists()
                    .col(uuid_col(ForumVotes::AnswerId))
                    .col(uuid_col(ForumVotes::UserId))
                    .col(text_col(ForumVotes::VoteType))
                    .col(timestamp_col(ForumVotes::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(ForumVotes::AnswerId)
                            .col(ForumVotes::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(uuid_pk(Orders::Id))
                    .col(text_col(Orders::OrderNumber).unique_key())
                    .col(uuid_col(Orders::BuyerId))
                    .col(uuid_col(Orders::FactoryId))
                    .col(text_col(Orders::Items))
                    .col(ColumnDef::new(Orders::TotalMinor).big_integer().not_null())
                    .col(text_col(Orders::Currency))
                    .col(text_col(Orders::Status))
                    .col(ColumnDef::new(Orders::CheckoutSessionId).text())
                    .col(timestamp_col(Orders::CreatedAt))
                    .col(timestamp_col(Orders::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(uuid_pk(Notifications::Id))
                    .col(uuid_col(Notifications::UserId))
                    .col(text_col(Notifications::Kind))
                    .col(text_col(Notifications::Title))
                    .col(text_col(Notifications::Message))
                    .col(ColumnDef::new(Notifications::Link).text())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp_col(Notifications::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_read")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::IsRead)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatMessages::Table)
                    .if_not_exists()
                    .col(uuid_pk(ChatMessages::Id))
                    .col(uuid_col(ChatMessages::UserId))
                    .col(text_col(ChatMessages::SessionId))
                    .col(text_col(ChatMessages::Role))
                    .col(text_col(ChatMessages::Content))
                    .col(timestamp_col(ChatMessages::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_messages_user_session")
                    .table(ChatMessages::Table)
                    .col(ChatMessages::UserId)
                    .col(ChatMessages::SessionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Conversations::Table)
                    .if_not_exists()
                    .col(uuid_pk(Conversations::Id))
                    .col(uuid_col(Conversations::BuyerId))
                    .col(uuid_col(Conversations::FactoryId))
                    .col(timestamp_col(Conversations::CreatedAt))
                    .col(timestamp_col(Conversations::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_conversations_pair")
                    .table(Conversations::Table)
                    .col(Conversations::BuyerId)
                    .col(Conversations::FactoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(uuid_pk(Messages::Id))
                    .col(uuid_col(Messages::ConversationId))
                    .col(uuid_col(Messages::SenderId))
                    .col(text_col(Messages::Content))
                    .col(timestamp_col(Messages::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_messages_conversation")
                    .table(Messages::Table)
                    .col(Messages::ConversationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Messages::Table.into_iden(),
            Conversations::Table.into_iden(),
            ChatMessages::Table.into_iden(),
            Notifications::Table.into_iden(),
            Orders::Table.into_iden(),
            ForumVotes::Table.into_iden(),
            ForumAnswers::Table.into_iden(),
            ForumPosts::Table.into_iden(),
            Inquiries::Table.into_iden(),
            Products::Table.into_iden(),
            Factories::Table.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
    FactoryId,
    CreatedAt,
    UpdatedAt,
    LastSignedIn,
}

#[derive(DeriveIden)]
enum Factories {
    Table,
    Id,
    Name,
    Description,
    Location,
    ContactEmail,
    ContactPhone,
    VerificationStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    FactoryId,
    Name,
    Description,
    Category,
    PriceMinor,
    MinOrderQuantity,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Inquiries {
    Table,
    Id,
    BuyerId,
    FactoryId,
    Subject,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ForumPosts {
    Table,
    Id,
    AuthorId,
    Title,
    Content,
    Category,
    Tags,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ForumAnswers {
    Table,
    Id,
    PostId,
    AuthorId,
    Content,
    Votes,
    IsBest,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ForumVotes {
    Table,
    AnswerId,
    UserId,
    VoteType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    BuyerId,
    FactoryId,
    Items,
    TotalMinor,
    Currency,
    Status,
    CheckoutSessionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Kind,
    Title,
    Message,
    Link,
    IsRead,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatMessages {
    Table,
    Id,
    UserId,
    SessionId,
    Role,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Conversations {
    Table,
    Id,
    BuyerId,
    FactoryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    Id,
    ConversationId,
    SenderId,
    Content,
    CreatedAt,
}
