//! Viewer-scope resolution and record visibility.
//!
//! One ownership rule is shared by events and preparations: a record
//! is visible when it belongs to the scoped child or is family-wide
//! (`child_id` unset). Messages use a distinct, slightly broader rule
//! and must not be folded into the ownership rule.
//!
//! `child_id` is always a child-profile id. A child account's scope
//! is resolved to its linked profile at the REST boundary; this
//! module never guesses which identifier space an id belongs to.

use shared::Role;

/// The requesting user, after identity resolution.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user_id: String,
    pub role: Role,
    /// Parent-selected child filter (a child-profile id).
    pub child_filter: Option<String>,
    /// For child accounts: the linked child-profile id, if any.
    pub linked_profile_id: Option<String>,
}

/// Visibility restriction derived from a [`Viewer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerScope {
    /// No filtering; parent browsing the whole family.
    All,
    /// Parent filtering down to one child profile.
    Child(String),
    /// Child account restricted to its own profile.
    OwnerOnly(String),
    /// Child account with no linked profile: family-wide records only.
    SharedOnly,
    /// Unresolvable viewer; nothing is visible (fail closed).
    Denied,
}

impl Viewer {
    pub fn scope(&self) -> ViewerScope {
        match self.role {
            Role::Parent => match &self.child_filter {
                None => ViewerScope::All,
                Some(id) if id.is_empty() => ViewerScope::Denied,
                Some(id) => ViewerScope::Child(id.clone()),
            },
            Role::Child => match &self.linked_profile_id {
                Some(id) if !id.is_empty() => ViewerScope::OwnerOnly(id.clone()),
                Some(_) => ViewerScope::Denied,
                None => ViewerScope::SharedOnly,
            },
        }
    }
}

impl ViewerScope {
    /// The shared ownership rule for events and preparations.
    pub fn allows(&self, child_id: Option<&str>) -> bool {
        match self {
            ViewerScope::All => true,
            ViewerScope::Child(id) | ViewerScope::OwnerOnly(id) => {
                child_id.is_none() || child_id == Some(id.as_str())
            }
            ViewerScope::SharedOnly => child_id.is_none(),
            ViewerScope::Denied => false,
        }
    }
}

/// The message rule: broadcast, addressed to the viewer, or sent by
/// the viewer.
pub fn message_visible(from_user_id: &str, to_user_id: Option<&str>, viewer: &Viewer) -> bool {
    to_user_id.is_none()
        || to_user_id == Some(viewer.user_id.as_str())
        || from_user_id == viewer.user_id
}
