use shared::{Role, UserDto};

/// Domain model for a user account. The password hash never leaves
/// this layer.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub family_id: Option<String>,
    pub color: Option<String>,
}

impl User {
    pub fn to_dto(&self) -> UserDto {
        UserDto {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            family_id: self.family_id.clone(),
            color: self.color.clone(),
        }
    }
}
