use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RbacPermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RbacPermissions::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RbacPermissions::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Links and defaults may reference permissions that no longer exist;
        // the loader reports those instead of the schema rejecting them.
        manager
            .create_table(
                Table::create()
                    .table(RbacLinkedPermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RbacLinkedPermissions::Id)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RbacLinkedPermissions::LinkedId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_rbac_linked_permissions")
                            .col(RbacLinkedPermissions::Id)
                            .col(RbacLinkedPermissions::LinkedId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RbacDefaultPermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RbacDefaultPermissions::SecLevel)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RbacDefaultPermissions::PermissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RbacDefaultPermissions::RealmId)
                            .integer()
                            .not_null()
                            .default(-1),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_rbac_default_permissions")
                            .col(RbacDefaultPermissions::SecLevel)
                            .col(RbacDefaultPermissions::PermissionId)
                            .col(RbacDefaultPermissions::RealmId),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RbacDefaultPermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RbacLinkedPermissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RbacPermissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RbacPermissions {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum RbacLinkedPermissions {
    Table,
    Id,
    LinkedId,
}

#[derive(DeriveIden)]
enum RbacDefaultPermissions {
    Table,
    SecLevel,
    PermissionId,
    RealmId,
}
