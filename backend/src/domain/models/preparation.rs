use chrono::NaiveDate;
use shared::PreparationDto;

use crate::domain::dday;

/// Domain model for a due-dated checklist item.
#[derive(Debug, Clone, PartialEq)]
pub struct Preparation {
    pub id: String,
    pub family_id: String,
    pub child_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub due_date: NaiveDate,
    pub is_completed: bool,
    pub created_by: String,
}

impl Preparation {
    /// Wire form with the D-day derivations computed against `today`.
    pub fn to_dto(&self, today: NaiveDate) -> PreparationDto {
        PreparationDto {
            id: self.id.clone(),
            family_id: self.family_id.clone(),
            child_id: self.child_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            due_date: self.due_date.format("%Y-%m-%d").to_string(),
            is_completed: self.is_completed,
            created_by: self.created_by.clone(),
            d_day: dday::label(self.due_date, today),
            is_urgent: dday::is_urgent(self.due_date, today),
            is_overdue: dday::is_overdue(self.due_date, today),
        }
    }
}
