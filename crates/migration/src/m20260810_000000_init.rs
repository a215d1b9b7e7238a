//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Untangle:
//!
//! - `users`: authentication
//! - `branches`: venue locations
//! - `members`: customers keyed by normalized mobile number
//! - `purchases`: credit-grant events with rollover bookkeeping
//! - `gaming_sessions`: table time charged against member balances
//! - `balance_adjustments`: audit trail of manual balance corrections
//!
//! Expiry dates are not stored anywhere; they derive from purchase dates.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Branches {
    Table,
    Id,
    Name,
    Address,
}

#[derive(Iden)]
enum Members {
    Table,
    Id,
    Mobile,
    FullName,
    Email,
    TotalHoursGrantedCenti,
    TotalHoursUsedCenti,
    BranchId,
    Version,
    CreatedAt,
}

#[derive(Iden)]
enum Purchases {
    Table,
    Id,
    MemberId,
    PlanName,
    HoursGrantedCenti,
    TotalValidPurchasedCenti,
    PurchaseDate,
    RolloverStatus,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum GamingSessions {
    Table,
    Id,
    MemberId,
    BranchId,
    TableNumber,
    GameTitle,
    StartedAt,
    EndedAt,
    HoursConsumedCenti,
    Status,
    CreatedBy,
}

#[derive(Iden)]
enum BalanceAdjustments {
    Table,
    Id,
    MemberId,
    DeltaCenti,
    Reason,
    Actor,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Branches
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Branches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Branches::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Branches::Name).string().not_null())
                    .col(ColumnDef::new(Branches::Address).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-branches-name-unique")
                    .table(Branches::Table)
                    .col(Branches::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Members
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
                    .col(ColumnDef::new(Members::Mobile).string().not_null())
                    .col(ColumnDef::new(Members::FullName).string().not_null())
                    .col(ColumnDef::new(Members::Email).string())
                    .col(
                        ColumnDef::new(Members::TotalHoursGrantedCenti)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Members::TotalHoursUsedCenti)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Members::BranchId).string())
                    .col(ColumnDef::new(Members::Version).big_integer().not_null())
                    .col(ColumnDef::new(Members::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-members-branch_id")
                            .from(Members::Table, Members::BranchId)
                            .to(Branches::Table, Branches::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-members-mobile-unique")
                    .table(Members::Table)
                    .col(Members::Mobile)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-members-branch_id")
                    .table(Members::Table)
                    .col(Members::BranchId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Purchases
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchases::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchases::MemberId).string().not_null())
                    .col(ColumnDef::new(Purchases::PlanName).string().not_null())
                    .col(
                        ColumnDef::new(Purchases::HoursGrantedCenti)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::TotalValidPurchasedCenti)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::PurchaseDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::RolloverStatus)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Purchases::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Purchases::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-purchases-member_id")
                            .from(Purchases::Table, Purchases::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-member_id-purchase_date")
                    .table(Purchases::Table)
                    .col(Purchases::MemberId)
                    .col(Purchases::PurchaseDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-purchases-rollover_status")
                    .table(Purchases::Table)
                    .col(Purchases::RolloverStatus)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Gaming Sessions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GamingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GamingSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GamingSessions::MemberId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GamingSessions::BranchId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GamingSessions::TableNumber)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GamingSessions::GameTitle)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GamingSessions::StartedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GamingSessions::EndedAt).timestamp())
                    .col(
                        ColumnDef::new(GamingSessions::HoursConsumedCenti)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GamingSessions::Status).string().not_null())
                    .col(
                        ColumnDef::new(GamingSessions::CreatedBy)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-gaming_sessions-member_id")
                            .from(GamingSessions::Table, GamingSessions::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-gaming_sessions-branch_id")
                            .from(GamingSessions::Table, GamingSessions::BranchId)
                            .to(Branches::Table, Branches::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-gaming_sessions-member_id-status")
                    .table(GamingSessions::Table)
                    .col(GamingSessions::MemberId)
                    .col(GamingSessions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-gaming_sessions-status")
                    .table(GamingSessions::Table)
                    .col(GamingSessions::Status)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Balance Adjustments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BalanceAdjustments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalanceAdjustments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BalanceAdjustments::MemberId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceAdjustments::DeltaCenti)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceAdjustments::Reason)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceAdjustments::Actor)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceAdjustments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance_adjustments-member_id")
                            .from(BalanceAdjustments::Table, BalanceAdjustments::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-balance_adjustments-member_id")
                    .table(BalanceAdjustments::Table)
                    .col(BalanceAdjustments::MemberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BalanceAdjustments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GamingSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Branches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
