use shared::{ChildProfileDto, FamilyDto};

/// Domain model for a family group.
#[derive(Debug, Clone, PartialEq)]
pub struct Family {
    pub id: String,
    pub name: String,
    pub invite_code: String,
    pub created_by: String,
}

impl Family {
    pub fn to_dto(&self) -> FamilyDto {
        FamilyDto {
            id: self.id.clone(),
            name: self.name.clone(),
            parent_invite_code: self.invite_code.clone(),
        }
    }
}

/// A child profile created by a parent. May or may not be linked to a
/// child login.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildProfile {
    pub id: String,
    pub family_id: String,
    pub name: String,
    pub color: String,
    pub invite_code: String,
    pub linked_user_id: Option<String>,
    pub created_by: String,
}

impl ChildProfile {
    pub fn to_dto(&self) -> ChildProfileDto {
        ChildProfileDto {
            id: self.id.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
            invite_code: self.invite_code.clone(),
            linked_user_id: self.linked_user_id.clone(),
            is_linked: self.linked_user_id.is_some(),
        }
    }
}
