//! Ownership-based authorization.
//!
//! Every mutating use case calls [`authorize`] with the acting user before it
//! touches storage. Reads of content are open to any authenticated user;
//! account records are private to their owner.

use super::{Error, UserId};

/// Thing being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// An account record.
    Account { id: UserId },
    /// A question or an answer.
    Content { owner: UserId },
}

/// What the actor wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    /// Convert a denial into a `forbidden` domain error.
    pub fn require(self, message: &str) -> Result<(), Error> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny => Err(Error::forbidden(message)),
        }
    }
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// # Examples
/// ```
/// use campus_qa::domain::{Action, Decision, Resource, UserId, authorize};
///
/// let owner = UserId::random();
/// let other = UserId::random();
/// let question = Resource::Content { owner };
/// assert_eq!(authorize(other, question, Action::Read), Decision::Allow);
/// assert_eq!(authorize(other, question, Action::Delete), Decision::Deny);
/// ```
pub fn authorize(actor: UserId, resource: Resource, action: Action) -> Decision {
    let allowed = match (resource, action) {
        (Resource::Account { id }, _) => actor == id,
        (Resource::Content { .. }, Action::Read) => true,
        (Resource::Content { owner }, Action::Update | Action::Delete) => actor == owner,
    };
    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}
