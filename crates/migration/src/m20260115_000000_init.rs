//! Initial schema migration - creates all tables from scratch.
//!
//! - `members`: login identities and the household they belong to
//! - `households`: sharing boundaries with their invite code
//! - `expenses`: shared expense records with split configuration
//! - `meals`: dish definitions with remaining portion stock
//! - `planned_slots`: one calendar cell per (household, date, service)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Members {
    Table,
    Id,
    Password,
    DisplayName,
    HouseholdId,
}

#[derive(Iden)]
enum Households {
    Table,
    Id,
    Name,
    Code,
    CreatedBy,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    HouseholdId,
    Title,
    AmountMinor,
    Category,
    Date,
    PayerId,
    SplitMode,
    SplitAmong,
    CustomAmounts,
}

#[derive(Iden)]
enum Meals {
    Table,
    Id,
    HouseholdId,
    Name,
    NameNorm,
    Kind,
    QuantityHundredths,
    Notes,
    Ingredients,
}

#[derive(Iden)]
enum PlannedSlots {
    Table,
    Id,
    HouseholdId,
    Date,
    Service,
    Meals,
    Processed,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Members::Password).string().not_null())
                    .col(ColumnDef::new(Members::DisplayName).string().not_null())
                    .col(ColumnDef::new(Members::HouseholdId).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Households
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Households::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Households::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Households::Name).string().not_null())
                    .col(ColumnDef::new(Households::Code).string().not_null())
                    .col(ColumnDef::new(Households::CreatedBy).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-households-created_by")
                            .from(Households::Table, Households::CreatedBy)
                            .to(Members::Table, Members::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-households-code-unique")
                    .table(Households::Table)
                    .col(Households::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::HouseholdId).string().not_null())
                    .col(ColumnDef::new(Expenses::Title).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::PayerId).string().not_null())
                    .col(ColumnDef::new(Expenses::SplitMode).string().not_null())
                    .col(ColumnDef::new(Expenses::SplitAmong).json().not_null())
                    .col(ColumnDef::new(Expenses::CustomAmounts).json().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-household_id")
                            .from(Expenses::Table, Expenses::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-household_id-date")
                    .table(Expenses::Table)
                    .col(Expenses::HouseholdId)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Meals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Meals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Meals::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Meals::HouseholdId).string().not_null())
                    .col(ColumnDef::new(Meals::Name).string().not_null())
                    .col(ColumnDef::new(Meals::NameNorm).string().not_null())
                    .col(ColumnDef::new(Meals::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Meals::QuantityHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Meals::Notes).string())
                    .col(ColumnDef::new(Meals::Ingredients).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-meals-household_id")
                            .from(Meals::Table, Meals::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-meals-household_id-name_norm-unique")
                    .table(Meals::Table)
                    .col(Meals::HouseholdId)
                    .col(Meals::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Planned slots
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PlannedSlots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlannedSlots::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlannedSlots::HouseholdId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlannedSlots::Date).date().not_null())
                    .col(ColumnDef::new(PlannedSlots::Service).string().not_null())
                    .col(ColumnDef::new(PlannedSlots::Meals).json().not_null())
                    .col(
                        ColumnDef::new(PlannedSlots::Processed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-planned_slots-household_id")
                            .from(PlannedSlots::Table, PlannedSlots::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The sweeper selects by (household, processed, date).
        manager
            .create_index(
                Index::create()
                    .name("idx-planned_slots-household_id-processed-date")
                    .table(PlannedSlots::Table)
                    .col(PlannedSlots::HouseholdId)
                    .col(PlannedSlots::Processed)
                    .col(PlannedSlots::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlannedSlots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Meals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Households::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        Ok(())
    }
}
