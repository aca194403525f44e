//! Initial database migration.
//!
//! Creates the organization profile, users, membership, dues, cashbook,
//! assessment and archery tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: ORGANIZATION & USERS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(pk(Organizations::Id))
                    .col(ColumnDef::new(Organizations::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Organizations::Address).text())
                    .col(ColumnDef::new(Organizations::Phone).string_len(50))
                    .col(ColumnDef::new(Organizations::Email).string_len(255))
                    .col(ColumnDef::new(Organizations::Logo).text())
                    .col(ColumnDef::new(Organizations::Website).string_len(255))
                    .col(ColumnDef::new(Organizations::Description).text())
                    .col(timestamp(Organizations::CreatedAt))
                    .col(timestamp(Organizations::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk(Users::Id))
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(20)
                            .not_null()
                            .default("user"),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: MEMBERS & TARIFFS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(pk(Members::Id))
                    .col(ColumnDef::new(Members::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Members::Nik).string_len(50))
                    .col(ColumnDef::new(Members::Address).text())
                    .col(ColumnDef::new(Members::Phone).string_len(50))
                    .col(ColumnDef::new(Members::Email).string_len(255))
                    .col(ColumnDef::new(Members::JoinedOn).date())
                    .col(
                        ColumnDef::new(Members::Status)
                            .string_len(20)
                            .not_null()
                            .default("aktif"),
                    )
                    .col(timestamp(Members::CreatedAt))
                    .col(timestamp(Members::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tariffs::Table)
                    .if_not_exists()
                    .col(pk(Tariffs::Id))
                    .col(ColumnDef::new(Tariffs::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Tariffs::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Tariffs::Frequency)
                            .string_len(20)
                            .not_null()
                            .default("bulanan"),
                    )
                    .col(ColumnDef::new(Tariffs::Notes).text())
                    .col(
                        ColumnDef::new(Tariffs::Status)
                            .string_len(20)
                            .not_null()
                            .default("aktif"),
                    )
                    .col(timestamp(Tariffs::CreatedAt))
                    .col(timestamp(Tariffs::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MemberTariffs::Table)
                    .if_not_exists()
                    .col(pk(MemberTariffs::Id))
                    .col(ColumnDef::new(MemberTariffs::MemberId).integer().not_null())
                    .col(ColumnDef::new(MemberTariffs::TariffId).integer().not_null())
                    .col(timestamp(MemberTariffs::CreatedAt))
                    .foreign_key(&mut cascade(
                        "fk_member_tariffs_member",
                        (MemberTariffs::Table, MemberTariffs::MemberId),
                        (Members::Table, Members::Id),
                    ))
                    .foreign_key(&mut cascade(
                        "fk_member_tariffs_tariff",
                        (MemberTariffs::Table, MemberTariffs::TariffId),
                        (Tariffs::Table, Tariffs::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_member_tariffs_pair")
                    .table(MemberTariffs::Table)
                    .col(MemberTariffs::MemberId)
                    .col(MemberTariffs::TariffId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 3: DUES & CASHBOOK
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Dues::Table)
                    .if_not_exists()
                    .col(pk(Dues::Id))
                    .col(ColumnDef::new(Dues::MemberId).integer().not_null())
                    .col(ColumnDef::new(Dues::TariffId).integer())
                    .col(ColumnDef::new(Dues::Month).integer().not_null())
                    .col(ColumnDef::new(Dues::Year).integer().not_null())
                    .col(
                        ColumnDef::new(Dues::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Dues::Frequency)
                            .string_len(20)
                            .not_null()
                            .default("bulanan"),
                    )
                    .col(ColumnDef::new(Dues::PaidOn).date())
                    .col(
                        ColumnDef::new(Dues::Status)
                            .string_len(20)
                            .not_null()
                            .default("lunas"),
                    )
                    .col(ColumnDef::new(Dues::Notes).text().not_null().default(""))
                    .col(timestamp(Dues::CreatedAt))
                    .col(timestamp(Dues::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_dues_member",
                        (Dues::Table, Dues::MemberId),
                        (Members::Table, Members::Id),
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dues_tariff")
                            .from(Dues::Table, Dues::TariffId)
                            .to(Tariffs::Table, Tariffs::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dues_member_period")
                    .table(Dues::Table)
                    .col(Dues::MemberId)
                    .col(Dues::Year)
                    .col(Dues::Month)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CashbookEntries::Table)
                    .if_not_exists()
                    .col(pk(CashbookEntries::Id))
                    .col(ColumnDef::new(CashbookEntries::EntryDate).date().not_null())
                    .col(ColumnDef::new(CashbookEntries::Description).text().not_null())
                    .col(
                        ColumnDef::new(CashbookEntries::Category)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(CashbookEntries::Debit)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CashbookEntries::Credit)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CashbookEntries::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(CashbookEntries::CreatedAt))
                    .check(Expr::col(CashbookEntries::Debit).gte(0))
                    .check(Expr::col(CashbookEntries::Credit).gte(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cashbook_entries_date")
                    .table(CashbookEntries::Table)
                    .col(CashbookEntries::EntryDate)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 4: ASSESSMENTS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(AssessmentTypes::Table)
                    .if_not_exists()
                    .col(pk(AssessmentTypes::Id))
                    .col(ColumnDef::new(AssessmentTypes::Name).string_len(255).not_null())
                    .col(ColumnDef::new(AssessmentTypes::Description).text())
                    .col(
                        ColumnDef::new(AssessmentTypes::Weight)
                            .decimal_len(7, 2)
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(AssessmentTypes::Status)
                            .string_len(20)
                            .not_null()
                            .default("aktif"),
                    )
                    .col(timestamp(AssessmentTypes::CreatedAt))
                    .col(timestamp(AssessmentTypes::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assessments::Table)
                    .if_not_exists()
                    .col(pk(Assessments::Id))
                    .col(ColumnDef::new(Assessments::MemberId).integer().not_null())
                    .col(
                        ColumnDef::new(Assessments::AssessmentTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assessments::Month).integer().not_null())
                    .col(ColumnDef::new(Assessments::Year).integer().not_null())
                    .col(
                        ColumnDef::new(Assessments::Score)
                            .decimal_len(7, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Assessments::Notes).text())
                    .col(timestamp(Assessments::CreatedAt))
                    .col(timestamp(Assessments::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_assessments_member",
                        (Assessments::Table, Assessments::MemberId),
                        (Members::Table, Members::Id),
                    ))
                    .foreign_key(&mut cascade(
                        "fk_assessments_type",
                        (Assessments::Table, Assessments::AssessmentTypeId),
                        (AssessmentTypes::Table, AssessmentTypes::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_assessments_period")
                    .table(Assessments::Table)
                    .col(Assessments::MemberId)
                    .col(Assessments::AssessmentTypeId)
                    .col(Assessments::Month)
                    .col(Assessments::Year)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 5: ARCHERY
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(ArcheryGames::Table)
                    .if_not_exists()
                    .col(pk(ArcheryGames::Id))
                    .col(ColumnDef::new(ArcheryGames::MemberId).integer().not_null())
                    .col(ColumnDef::new(ArcheryGames::PlayedOn).date().not_null())
                    .col(
                        ColumnDef::new(ArcheryGames::SessionCount)
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .col(
                        ColumnDef::new(ArcheryGames::TotalScore)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ArcheryGames::Notes).text())
                    .col(timestamp(ArcheryGames::CreatedAt))
                    .col(timestamp(ArcheryGames::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_archery_games_member",
                        (ArcheryGames::Table, ArcheryGames::MemberId),
                        (Members::Table, Members::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ArcheryEnds::Table)
                    .if_not_exists()
                    .col(pk(ArcheryEnds::Id))
                    .col(ColumnDef::new(ArcheryEnds::GameId).integer().not_null())
                    .col(ColumnDef::new(ArcheryEnds::SessionNumber).integer().not_null())
                    .col(ColumnDef::new(ArcheryEnds::EndNumber).integer().not_null())
                    .col(
                        ColumnDef::new(ArcheryEnds::TotalScore)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(ArcheryEnds::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_archery_ends_game",
                        (ArcheryEnds::Table, ArcheryEnds::GameId),
                        (ArcheryGames::Table, ArcheryGames::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_archery_ends_slot")
                    .table(ArcheryEnds::Table)
                    .col(ArcheryEnds::GameId)
                    .col(ArcheryEnds::SessionNumber)
                    .col(ArcheryEnds::EndNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ArcheryArrows::Table)
                    .if_not_exists()
                    .col(pk(ArcheryArrows::Id))
                    .col(ColumnDef::new(ArcheryArrows::GameId).integer().not_null())
                    .col(
                        ColumnDef::new(ArcheryArrows::SessionNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ArcheryArrows::EndNumber).integer().not_null())
                    .col(ColumnDef::new(ArcheryArrows::ArrowNumber).integer().not_null())
                    .col(
                        ColumnDef::new(ArcheryArrows::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ArcheryArrows::DisplayValue)
                            .string_len(10)
                            .not_null()
                            .default("0"),
                    )
                    .col(timestamp(ArcheryArrows::UpdatedAt))
                    .check(Expr::col(ArcheryArrows::Score).between(0, 10))
                    .foreign_key(&mut cascade(
                        "fk_archery_arrows_game",
                        (ArcheryArrows::Table, ArcheryArrows::GameId),
                        (ArcheryGames::Table, ArcheryGames::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_archery_arrows_slot")
                    .table(ArcheryArrows::Table)
                    .col(ArcheryArrows::GameId)
                    .col(ArcheryArrows::SessionNumber)
                    .col(ArcheryArrows::EndNumber)
                    .col(ArcheryArrows::ArrowNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ArcheryArrows::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArcheryEnds::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArcheryGames::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assessments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssessmentTypes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashbookEntries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Dues::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MemberTariffs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tariffs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

fn pk<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn cascade<F, T>(name: &str, from: (F, F), to: (T, T)) -> ForeignKeyCreateStatement
where
    F: IntoIden + 'static,
    T: IntoIden + 'static,
{
    ForeignKey::create()
        .name(name)
        .from(from.0, from.1)
        .to(to.0, to.1)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    Address,
    Phone,
    Email,
    Logo,
    Website,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Name,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    Name,
    Nik,
    Address,
    Phone,
    Email,
    JoinedOn,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tariffs {
    Table,
    Id,
    Name,
    Amount,
    Frequency,
    Notes,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MemberTariffs {
    Table,
    Id,
    MemberId,
    TariffId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Dues {
    Table,
    Id,
    MemberId,
    TariffId,
    Month,
    Year,
    Amount,
    Frequency,
    PaidOn,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CashbookEntries {
    Table,
    Id,
    EntryDate,
    Description,
    Category,
    Debit,
    Credit,
    Balance,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AssessmentTypes {
    Table,
    Id,
    Name,
    Description,
    Weight,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Assessments {
    Table,
    Id,
    MemberId,
    AssessmentTypeId,
    Month,
    Year,
    Score,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ArcheryGames {
    Table,
    Id,
    MemberId,
    PlayedOn,
    SessionCount,
    TotalScore,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ArcheryEnds {
    Table,
    Id,
    GameId,
    SessionNumber,
    EndNumber,
    TotalScore,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ArcheryArrows {
    Table,
    Id,
    GameId,
    SessionNumber,
    EndNumber,
    ArrowNumber,
    Score,
    DisplayValue,
    UpdatedAt,
}
