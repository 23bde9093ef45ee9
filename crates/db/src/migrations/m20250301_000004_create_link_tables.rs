//! Create link_category and link tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create link_category table
        manager
            .create_table(
                Table::create()
                    .table(LinkCategory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkCategory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LinkCategory::Name)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create link table
        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Link::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Link::CategoryId).string().null())
                    .col(ColumnDef::new(Link::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Link::Slug).string_len(256).not_null())
                    .col(ColumnDef::new(Link::Url).string_len(2048).not_null())
                    .col(ColumnDef::new(Link::Description).text().null())
                    .col(ColumnDef::new(Link::Image).string().null())
                    .col(
                        ColumnDef::new(Link::Published)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Link::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_link_category")
                            .from(Link::Table, Link::CategoryId)
                            .to(LinkCategory::Table, LinkCategory::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes for link table
        manager
            .create_index(
                Index::create()
                    .name("idx_link_slug")
                    .table(Link::Table)
                    .col(Link::Slug)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_link_category_id")
                    .table(Link::Table)
                    .col(Link::CategoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LinkCategory::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum LinkCategory {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Link {
    Table,
    Id,
    CategoryId,
    Title,
    Slug,
    Url,
    Description,
    Image,
    Published,
    CreatedAt,
    UpdatedAt,
}
