//! `SeaORM` Entity for daily_reconciliations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ReconStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_reconciliations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub business_id: Uuid,
    pub branch_id: i64,
    pub recon_date: Date,
    pub payment_method: String,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub net_system_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub actual_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub platform_fee: Decimal,
    pub status: ReconStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
