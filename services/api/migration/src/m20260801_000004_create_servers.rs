use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Servers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Servers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Servers::AppId).uuid().not_null())
                    .col(ColumnDef::new(Servers::Name).string().not_null())
                    .col(
                        ColumnDef::new(Servers::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Servers::GameModes).json_binary().not_null())
                    .col(ColumnDef::new(Servers::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Servers::IpAddress).string())
                    .col(
                        ColumnDef::new(Servers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Servers::Table, Servers::AppId)
                            .to(Apps::Table, Apps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Servers::Table, Servers::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Servers::Table)
                    .col(Servers::AppId)
                    .name("idx_servers_app_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Servers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Servers {
    Table,
    Id,
    AppId,
    Name,
    Description,
    GameModes,
    CreatedBy,
    IpAddress,
    CreatedAt,
}

#[derive(Iden)]
enum Apps {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
