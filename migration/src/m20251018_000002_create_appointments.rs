use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20251018_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(AppointmentStatus::Enum)
                    .values([
                        AppointmentStatus::Pending,
                        AppointmentStatus::Confirmed,
                        AppointmentStatus::Completed,
                        AppointmentStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Appointment::Table)
                    .if_not_exists()
                    .col(uuid(Appointment::Id).primary_key())
                    .col(uuid_null(Appointment::UserId))
                    .col(string_len(Appointment::Name, 100).not_null())
                    .col(string_len_null(Appointment::Email, 255))
                    .col(string_len(Appointment::Phone, 32).not_null())
                    .col(string_len(Appointment::Service, 100).not_null())
                    .col(timestamp_with_time_zone_null(Appointment::PreferredDate))
                    .col(text_null(Appointment::Message))
                    .col(
                        ColumnDef::new(Appointment::Status)
                            .custom(AppointmentStatus::Enum)
                            .not_null()
                            .default("pending"),
                    )
                    .col(text_null(Appointment::PickupLocation))
                    .col(double_null(Appointment::PickupLat))
                    .col(double_null(Appointment::PickupLng))
                    .col(string_len_null(Appointment::VehicleType, 100))
                    .col(boolean(Appointment::Urgent).not_null().default(false))
                    .col(string_len_null(Appointment::DistanceKm, 32))
                    .col(string_len_null(Appointment::EstimatedCost, 32))
                    .col(
                        timestamp_with_time_zone(Appointment::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_user")
                            .from(Appointment::Table, Appointment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_user_id")
                    .table(Appointment::Table)
                    .col(Appointment::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Appointment::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(AppointmentStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Appointment {
    Table,
    Id,
    UserId,
    Name,
    Email,
    Phone,
    Service,
    PreferredDate,
    Message,
    Status,
    PickupLocation,
    PickupLat,
    PickupLng,
    VehicleType,
    Urgent,
    DistanceKm,
    EstimatedCost,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum AppointmentStatus {
    #[sea_orm(iden = "appointment_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "confirmed")]
    Confirmed,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
}
