pub(crate) mod error;
pub(crate) mod queries;

pub use error::RepositoryError;
pub use migrations::Migrator;
pub use queries::{PdfStore, UserStore};

/// Database migrations module
pub mod migrations {
    use sea_orm_migration::prelude::*;

    /// Main migrator struct for database migrations
    pub struct Migrator;

    #[async_trait::async_trait]
    impl MigratorTrait for Migrator {
        fn migrations() -> Vec<Box<dyn MigrationTrait>> {
            vec![Box::new(tables::Migration)]
        }
    }

    /// Table creation for print jobs and users
    pub mod tables {
        use super::*;

        #[derive(DeriveMigrationName)]
        pub struct Migration;

        #[async_trait::async_trait]
        impl MigrationTrait for Migration {
            /// Creates the tables if they don't exist
            async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
                manager
                    .create_table(
                        Table::create()
                            .table(Pdfs::Table)
                            .if_not_exists()
                            .col(
                                ColumnDef::new(Pdfs::Id)
                                    .integer()
                                    .not_null()
                                    .auto_increment()
                                    .primary_key(),
                            )
                            .col(ColumnDef::new(Pdfs::Title).string().not_null())
                            .col(
                                ColumnDef::new(Pdfs::CreatedAt)
                                    .timestamp_with_time_zone()
                                    .not_null(),
                            )
                            .col(ColumnDef::new(Pdfs::FilePath).string().not_null())
                            // Unbounded: the page list has no length limit
                            .col(ColumnDef::new(Pdfs::Pages).text().not_null())
                            .to_owned(),
                    )
                    .await?;

                manager
                    .create_table(
                        Table::create()
                            .table(Users::Table)
                            .if_not_exists()
                            .col(
                                ColumnDef::new(Users::Id)
                                    .integer()
                                    .not_null()
                                    .auto_increment()
                                    .primary_key(),
                            )
                            .col(
                                ColumnDef::new(Users::Username)
                                    .string()
                                    .not_null()
                                    .unique_key(),
                            )
                            .col(ColumnDef::new(Users::Email).string().not_null())
                            .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                            .col(
                                ColumnDef::new(Users::JoinedAt)
                                    .timestamp_with_time_zone()
                                    .not_null(),
                            )
                            .col(
                                ColumnDef::new(Users::Active)
                                    .boolean()
                                    .not_null()
                                    .default(true),
                            )
                            .col(
                                ColumnDef::new(Users::IsAdmin)
                                    .boolean()
                                    .not_null()
                                    .default(false),
                            )
                            .to_owned(),
                    )
                    .await?;

                Ok(())
            }

            /// Drops the tables
            async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
                manager
                    .drop_table(Table::drop().table(Users::Table).to_owned())
                    .await?;
                manager
                    .drop_table(Table::drop().table(Pdfs::Table).to_owned())
                    .await?;
                Ok(())
            }
        }

        #[derive(Iden)]
        enum Pdfs {
            Table,
            Id,
            Title,
            CreatedAt,
            FilePath,
            Pages,
        }

        #[derive(Iden)]
        enum Users {
            Table,
            Id,
            Username,
            Email,
            PasswordHash,
            JoinedAt,
            Active,
            IsAdmin,
        }
    }
}
