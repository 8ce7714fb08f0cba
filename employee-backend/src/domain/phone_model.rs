// src/domain/phone_model.rs

use super::Phone;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "phones")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub employee_id: Uuid,

    pub number: String,

    #[sea_orm(nullable)]
    pub phone_type: Option<String>,

    pub created_at: DateTime<Utc>,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee_model::Entity",
        from = "Column::EmployeeId",
        to = "super::employee_model::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,
}

impl Related<super::employee_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Phone {
    fn from(model: Model) -> Self {
        Phone::restore(
            model.id,
            model.number,
            model.phone_type,
            model.created_at,
            model.updated_at,
        )
    }
}

impl ActiveModel {
    pub fn from_phone(employee_id: Uuid, phone: &Phone) -> Self {
        Self {
            id: Set(phone.id()),
            employee_id: Set(employee_id),
            number: Set(phone.number().to_string()),
            phone_type: Set(phone.phone_type().map(str::to_string)),
            created_at: Set(phone.created_at()),
            updated_at: Set(phone.updated_at()),
        }
    }
}
