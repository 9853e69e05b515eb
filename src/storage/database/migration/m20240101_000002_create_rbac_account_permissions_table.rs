use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RbacAccountPermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RbacAccountPermissions::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RbacAccountPermissions::PermissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RbacAccountPermissions::RealmId)
                            .integer()
                            .not_null()
                            .default(-1),
                    )
                    .col(
                        ColumnDef::new(RbacAccountPermissions::Granted)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_rbac_account_permissions")
                            .col(RbacAccountPermissions::AccountId)
                            .col(RbacAccountPermissions::PermissionId)
                            .col(RbacAccountPermissions::RealmId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_rbac_account_permissions_account_realm")
                    .table(RbacAccountPermissions::Table)
                    .col(RbacAccountPermissions::AccountId)
                    .col(RbacAccountPermissions::RealmId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RbacAccountPermissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RbacAccountPermissions {
    Table,
    AccountId,
    PermissionId,
    RealmId,
    Granted,
}
