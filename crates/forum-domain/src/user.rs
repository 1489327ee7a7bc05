//! Usuario del foro.
//!
//! Registro neutro: el engine lo ve como JSON dentro del contexto; este
//! tipo existe para que adapters y tests trabajen con datos con forma.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub admin: bool,
    pub moderator: bool,
    /// Presente mientras la suspensión esté vigente.
    pub suspended_till: Option<DateTime<Utc>>,
    pub suspend_reason: Option<String>,
}

impl User {
    pub fn new(id: u64, username: impl Into<String>) -> Result<Self, DomainError> {
        let username = username.into();
        if username.is_empty() || !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainError::InvalidUsername(username));
        }
        Ok(Self { id,
                  username,
                  admin: false,
                  moderator: false,
                  suspended_till: None,
                  suspend_reason: None })
    }

    /// Un usuario es staff si es admin o moderador.
    pub fn staff(&self) -> bool {
        self.admin || self.moderator
    }

    /// Suspensión vigente en el instante `now`.
    pub fn suspended(&self, now: DateTime<Utc>) -> bool {
        self.suspended_till.is_some_and(|till| till > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn rejects_invalid_usernames() {
        assert!(User::new(1, "").is_err());
        assert!(User::new(1, "with space").is_err());
        assert!(User::new(1, "ok_name_99").is_ok());
    }

    #[test]
    fn suspension_expires() {
        let now = Utc::now();
        let mut user = User::new(1, "eviltrout").expect("valid username");
        user.suspended_till = Some(now + Duration::days(1));
        assert!(user.suspended(now));
        assert!(!user.suspended(now + Duration::days(2)));
    }

    #[test]
    fn staff_covers_admin_and_moderator() {
        let mut user = User::new(1, "codinghorror").expect("valid username");
        assert!(!user.staff());
        user.moderator = true;
        assert!(user.staff());
    }
}
