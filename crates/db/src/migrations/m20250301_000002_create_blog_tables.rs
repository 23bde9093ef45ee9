//! Create blog_category, blog_tag, blog_post and blog_post_tag tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create blog_category table
        manager
            .create_table(
                Table::create()
                    .table(BlogCategory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogCategory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BlogCategory::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create blog_tag table
        manager
            .create_table(
                Table::create()
                    .table(BlogTag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogTag::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BlogTag::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create blog_post table
        manager
            .create_table(
                Table::create()
                    .table(BlogPost::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogPost::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BlogPost::UserId).string().not_null())
                    .col(ColumnDef::new(BlogPost::CategoryId).string().null())
                    .col(ColumnDef::new(BlogPost::Title).string_len(256).not_null())
                    .col(ColumnDef::new(BlogPost::Slug).string_len(256).not_null())
                    .col(ColumnDef::new(BlogPost::Summary).text().null())
                    .col(ColumnDef::new(BlogPost::Body).text().not_null())
                    .col(ColumnDef::new(BlogPost::Date).date().not_null())
                    .col(ColumnDef::new(BlogPost::OriginalImage).string().null())
                    .col(ColumnDef::new(BlogPost::ImageManifest).json_binary().null())
                    .col(ColumnDef::new(BlogPost::Images).json_binary().not_null())
                    .col(
                        ColumnDef::new(BlogPost::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BlogPost::Featured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BlogPost::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BlogPost::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_post_user")
                            .from(BlogPost::Table, BlogPost::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_post_category")
                            .from(BlogPost::Table, BlogPost::CategoryId)
                            .to(BlogCategory::Table, BlogCategory::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes for blog_post table
        manager
            .create_index(
                Index::create()
                    .name("idx_blog_post_slug")
                    .table(BlogPost::Table)
                    .col(BlogPost::Slug)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_post_user_id")
                    .table(BlogPost::Table)
                    .col(BlogPost::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_post_category_id")
                    .table(BlogPost::Table)
                    .col(BlogPost::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_post_date")
                    .table(BlogPost::Table)
                    .col(BlogPost::Date)
                    .to_owned(),
            )
            .await?;

        // Create blog_post_tag join table
        manager
            .create_table(
                Table::create()
                    .table(BlogPostTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogPostTag::PostId).string().not_null())
                    .col(ColumnDef::new(BlogPostTag::TagId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(BlogPostTag::PostId)
                            .col(BlogPostTag::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_post_tag_post")
                            .from(BlogPostTag::Table, BlogPostTag::PostId)
                            .to(BlogPost::Table, BlogPost::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_post_tag_tag")
                            .from(BlogPostTag::Table, BlogPostTag::TagId)
                            .to(BlogTag::Table, BlogTag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_post_tag_tag_id")
                    .table(BlogPostTag::Table)
                    .col(BlogPostTag::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlogPostTag::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BlogPost::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BlogTag::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BlogCategory::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum BlogCategory {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum BlogTag {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum BlogPost {
    Table,
    Id,
    UserId,
    CategoryId,
    Title,
    Slug,
    Summary,
    Body,
    Date,
    OriginalImage,
    ImageManifest,
    Images,
    Published,
    Featured,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BlogPostTag {
    Table,
    PostId,
    TagId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
