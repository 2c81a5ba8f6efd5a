//! `SeaORM` entities.

pub mod daily_reconciliations;
pub mod sea_orm_active_enums;
