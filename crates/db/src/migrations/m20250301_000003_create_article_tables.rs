//! Create article_category and article tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create article_category table
        manager
            .create_table(
                Table::create()
                    .table(ArticleCategory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ArticleCategory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ArticleCategory::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create article table
        manager
            .create_table(
                Table::create()
                    .table(Article::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Article::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Article::UserId).string().not_null())
                    .col(ColumnDef::new(Article::CategoryId).string().null())
                    .col(ColumnDef::new(Article::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Article::Slug).string_len(256).not_null())
                    .col(ColumnDef::new(Article::Summary).text().null())
                    .col(ColumnDef::new(Article::Body).text().not_null())
                    .col(ColumnDef::new(Article::Date).date().not_null())
                    .col(
                        ColumnDef::new(Article::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Article::OriginalImage).string().null())
                    .col(ColumnDef::new(Article::ImageManifest).json_binary().null())
                    .col(ColumnDef::new(Article::Images).json_binary().not_null())
                    .col(
                        ColumnDef::new(Article::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Article::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Article::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_user")
                            .from(Article::Table, Article::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_article_category")
                            .from(Article::Table, Article::CategoryId)
                            .to(ArticleCategory::Table, ArticleCategory::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes for article table
        manager
            .create_index(
                Index::create()
                    .name("idx_article_slug")
                    .table(Article::Table)
                    .col(Article::Slug)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_category_id")
                    .table(Article::Table)
                    .col(Article::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_display_order")
                    .table(Article::Table)
                    .col(Article::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Article::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ArticleCategory::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum ArticleCategory {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Article {
    Table,
    Id,
    UserId,
    CategoryId,
    Title,
    Slug,
    Summary,
    Body,
    Date,
    DisplayOrder,
    OriginalImage,
    ImageManifest,
    Images,
    Published,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
