//! Ownership check gating edits and deletes.

use uuid::Uuid;

use crate::error::DomainError;

/// Anything with a single author who alone may mutate it.
pub trait Authored {
    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    fn author_id(&self) -> Uuid;

    fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id() == user_id
    }
}

/// Deny mutation of `entity` by anyone but its author.
pub fn ensure_author<T: Authored>(entity: &T, user_id: Uuid) -> Result<(), DomainError> {
    if entity.is_authored_by(user_id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden(T::KIND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Comment;

    #[test]
    fn test_author_passes_others_are_forbidden() {
        let author = Uuid::new_v4();
        let comment = Comment::new(Uuid::new_v4(), author, "Nice".to_string());

        assert!(ensure_author(&comment, author).is_ok());
        assert!(matches!(
            ensure_author(&comment, Uuid::new_v4()),
            Err(DomainError::Forbidden("comment"))
        ));
    }
}
