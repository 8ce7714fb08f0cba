// src/domain/employee_model.rs

use super::{Employee, EmployeeSnapshot, Phone, Role};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub document_number: String,

    #[serde(skip_serializing)] // パスワードハッシュは絶対にシリアライズしない
    pub password_hash: String,

    pub birth_date: NaiveDate,

    /// Role の数値レベル（1..=3）
    pub role: i32,

    pub is_active: bool,

    #[sea_orm(nullable)]
    pub manager_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::phone_model::Entity")]
    Phones,

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ManagerId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Manager,
}

impl Related<super::phone_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Phones.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 行と電話番号から集約を復元
    pub fn into_employee(self, phones: Vec<super::phone_model::Model>) -> Result<Employee, DbErr> {
        let role = Role::from_level(self.role).ok_or_else(|| {
            DbErr::Type(format!(
                "Unknown role level {} for employee {}",
                self.role, self.id
            ))
        })?;

        Ok(Employee::restore(EmployeeSnapshot {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            document_number: self.document_number,
            password_hash: self.password_hash,
            birth_date: self.birth_date,
            role,
            is_active: self.is_active,
            manager_id: self.manager_id,
            phones: phones.into_iter().map(Phone::from).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

impl From<&Employee> for ActiveModel {
    fn from(employee: &Employee) -> Self {
        Self {
            id: Set(employee.id()),
            first_name: Set(employee.first_name().to_string()),
            last_name: Set(employee.last_name().to_string()),
            email: Set(employee.email().to_string()),
            document_number: Set(employee.document_number().to_string()),
            password_hash: Set(employee.password_hash().to_string()),
            birth_date: Set(employee.birth_date()),
            role: Set(employee.role().level()),
            is_active: Set(employee.is_active()),
            manager_id: Set(employee.manager_id()),
            created_at: Set(employee.created_at()),
            updated_at: Set(employee.updated_at()),
        }
    }
}
