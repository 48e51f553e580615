//! Initial schema migration - creates all tables from scratch.
//!
//! Consolidated schema for the household ledger:
//!
//! - `users`: household members
//! - `categories`: income/expense categories, global or per user
//! - `payment_methods`: how money moved, global or per user
//! - `expense_groups`: containers for shared expenses
//! - `group_members`: group enrolment
//! - `transactions`: ledger rows, one per instalment
//! - `expense_splits`: shares owed by non-payer participants
//! - `budgets`: per-category spending caps
//! - `savings_goals`: saving targets (schema only for now)
//! - `user_settings`: presentation defaults
//! - `tutorial_progress`: onboarding steps

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
    Name,
    Email,
    CreatedAt,
    IsActive,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    Kind,
    Icon,
    Color,
    Owner,
    IsDefault,
    CreatedAt,
}

#[derive(Iden)]
enum PaymentMethods {
    Table,
    Id,
    Name,
    Kind,
    Owner,
    IsDefault,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseGroups {
    Table,
    Id,
    Name,
    Description,
    CreatedBy,
    CreatedAt,
    IsActive,
}

#[derive(Iden)]
enum GroupMembers {
    Table,
    Id,
    GroupId,
    Member,
    JoinedAt,
    IsActive,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Owner,
    CategoryId,
    PaymentMethodId,
    Date,
    Amount,
    Kind,
    Details,
    InstallmentsPaid,
    InstallmentsTotal,
    PurchaseId,
    IsShared,
    GroupId,
    OriginalAmount,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseSplits {
    Table,
    Id,
    TransactionId,
    Debtor,
    Amount,
    Percentage,
    Status,
    PaidAt,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    Owner,
    CategoryId,
    Amount,
    Period,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum SavingsGoals {
    Table,
    Id,
    Owner,
    Name,
    TargetAmount,
    CurrentAmount,
    TargetDate,
    Description,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum UserSettings {
    Table,
    Username,
    Currency,
    DateFormat,
    Theme,
    BudgetAlerts,
    Extra,
}

#[derive(Iden)]
enum TutorialProgress {
    Table,
    Id,
    Username,
    StepName,
    Completed,
    CompletedAt,
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
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::Icon).string())
                    .col(ColumnDef::new(Categories::Color).string())
                    .col(ColumnDef::new(Categories::Owner).string())
                    .col(
                        ColumnDef::new(Categories::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Categories::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-owner")
                            .from(Categories::Table, Categories::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name-owner-unique")
                    .table(Categories::Table)
                    .col(Categories::Name)
                    .col(Categories::Owner)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Payment methods
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PaymentMethods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentMethods::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PaymentMethods::Name).string().not_null())
                    .col(ColumnDef::new(PaymentMethods::Kind).string().not_null())
                    .col(ColumnDef::new(PaymentMethods::Owner).string())
                    .col(
                        ColumnDef::new(PaymentMethods::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PaymentMethods::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payment_methods-owner")
                            .from(PaymentMethods::Table, PaymentMethods::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payment_methods-name-owner-unique")
                    .table(PaymentMethods::Table)
                    .col(PaymentMethods::Name)
                    .col(PaymentMethods::Owner)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expense groups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseGroups::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseGroups::Name).string().not_null())
                    .col(ColumnDef::new(ExpenseGroups::Description).string())
                    .col(ColumnDef::new(ExpenseGroups::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseGroups::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseGroups::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_groups-created_by")
                            .from(ExpenseGroups::Table, ExpenseGroups::CreatedBy)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Group members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMembers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupMembers::GroupId).string().not_null())
                    .col(ColumnDef::new(GroupMembers::Member).string().not_null())
                    .col(ColumnDef::new(GroupMembers::JoinedAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(GroupMembers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_members-group_id")
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(ExpenseGroups::Table, ExpenseGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_members-member")
                            .from(GroupMembers::Table, GroupMembers::Member)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_members-group_id-member-unique")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::GroupId)
                    .col(GroupMembers::Member)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Owner).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::PaymentMethodId).integer())
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(ColumnDef::new(Transactions::Amount).double().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Details).string())
                    .col(
                        ColumnDef::new(Transactions::InstallmentsPaid)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Transactions::InstallmentsTotal)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Transactions::PurchaseId).string())
                    .col(
                        ColumnDef::new(Transactions::IsShared)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Transactions::GroupId).string())
                    .col(ColumnDef::new(Transactions::OriginalAmount).double())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-owner")
                            .from(Transactions::Table, Transactions::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-category_id")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-payment_method_id")
                            .from(Transactions::Table, Transactions::PaymentMethodId)
                            .to(PaymentMethods::Table, PaymentMethods::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-group_id")
                            .from(Transactions::Table, Transactions::GroupId)
                            .to(ExpenseGroups::Table, ExpenseGroups::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-owner-date")
                    .table(Transactions::Table)
                    .col(Transactions::Owner)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-category_id")
                    .table(Transactions::Table)
                    .col(Transactions::CategoryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Expense splits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseSplits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseSplits::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseSplits::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseSplits::Debtor).string().not_null())
                    .col(ColumnDef::new(ExpenseSplits::Amount).double().not_null())
                    .col(ColumnDef::new(ExpenseSplits::Percentage).double())
                    .col(
                        ColumnDef::new(ExpenseSplits::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ExpenseSplits::PaidAt).timestamp())
                    .col(ColumnDef::new(ExpenseSplits::Notes).string())
                    .col(
                        ColumnDef::new(ExpenseSplits::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_splits-transaction_id")
                            .from(ExpenseSplits::Table, ExpenseSplits::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_splits-debtor")
                            .from(ExpenseSplits::Table, ExpenseSplits::Debtor)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_splits-transaction_id")
                    .table(ExpenseSplits::Table)
                    .col(ExpenseSplits::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_splits-debtor")
                    .table(ExpenseSplits::Table)
                    .col(ExpenseSplits::Debtor)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::Owner).string().not_null())
                    .col(ColumnDef::new(Budgets::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Budgets::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Budgets::Period)
                            .string()
                            .not_null()
                            .default("monthly"),
                    )
                    .col(
                        ColumnDef::new(Budgets::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Budgets::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-owner")
                            .from(Budgets::Table, Budgets::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-category_id")
                            .from(Budgets::Table, Budgets::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-owner-category_id-period-unique")
                    .table(Budgets::Table)
                    .col(Budgets::Owner)
                    .col(Budgets::CategoryId)
                    .col(Budgets::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Savings goals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SavingsGoals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingsGoals::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavingsGoals::Owner).string().not_null())
                    .col(ColumnDef::new(SavingsGoals::Name).string().not_null())
                    .col(
                        ColumnDef::new(SavingsGoals::TargetAmount)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::CurrentAmount)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(SavingsGoals::TargetDate).date())
                    .col(ColumnDef::new(SavingsGoals::Description).string())
                    .col(
                        ColumnDef::new(SavingsGoals::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SavingsGoals::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-savings_goals-owner")
                            .from(SavingsGoals::Table, SavingsGoals::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. User settings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UserSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSettings::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserSettings::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(
                        ColumnDef::new(UserSettings::DateFormat)
                            .string()
                            .not_null()
                            .default("DD/MM/YYYY"),
                    )
                    .col(
                        ColumnDef::new(UserSettings::Theme)
                            .string()
                            .not_null()
                            .default("light"),
                    )
                    .col(
                        ColumnDef::new(UserSettings::BudgetAlerts)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(UserSettings::Extra).json())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_settings-username")
                            .from(UserSettings::Table, UserSettings::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 11. Tutorial progress
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TutorialProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TutorialProgress::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TutorialProgress::Username)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TutorialProgress::StepName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TutorialProgress::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TutorialProgress::CompletedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tutorial_progress-username")
                            .from(TutorialProgress::Table, TutorialProgress::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tutorial_progress-username-step_name-unique")
                    .table(TutorialProgress::Table)
                    .col(TutorialProgress::Username)
                    .col(TutorialProgress::StepName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TutorialProgress::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavingsGoals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseSplits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
