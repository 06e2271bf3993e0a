use chrono::NaiveDate;
use shared::{EventDto, Frequency, RecurrenceDto};

use crate::domain::recurrence::{Recurrence, FREQ_DAILY, FREQ_WEEKLY};

/// Domain model for a calendar event. `child_id` is a child-profile
/// id; `None` means the event is family-wide.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub family_id: String,
    pub child_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub start_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_all_day: bool,
    pub color: Option<String>,
    pub created_by: String,
    pub recurrence: Option<Recurrence>,
}

impl Event {
    pub fn to_dto(&self) -> EventDto {
        EventDto {
            id: self.id.clone(),
            family_id: self.family_id.clone(),
            child_id: self.child_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            start_date: self.start_date.format("%Y-%m-%d").to_string(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            is_all_day: self.is_all_day,
            color: self.color.clone(),
            created_by: self.created_by.clone(),
            recurrence: self.recurrence.as_ref().and_then(recurrence_to_dto),
        }
    }
}

/// Stored recurrences with an unrecognized frequency have no wire
/// representation; they are omitted rather than erroring the list.
fn recurrence_to_dto(rec: &Recurrence) -> Option<RecurrenceDto> {
    let frequency = match rec.frequency.as_str() {
        FREQ_DAILY => Frequency::Daily,
        FREQ_WEEKLY => Frequency::Weekly,
        _ => return None,
    };
    Some(RecurrenceDto {
        frequency,
        days_of_week: rec
            .days_of_week
            .iter()
            .filter_map(|d| u8::try_from(*d).ok())
            .filter(|d| *d <= 6)
            .collect(),
        end_date: rec.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
    })
}
