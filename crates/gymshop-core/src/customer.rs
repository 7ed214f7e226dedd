use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// The signed-in customer. Also the shape cached locally as user info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub default_address_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_address_id: Option<i64>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChange").finish_non_exhaustive()
    }
}

impl PasswordChange {
    /// # Errors
    ///
    /// [`ValidationError::EmptyPassword`] or [`ValidationError::PasswordMismatch`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.new_password.is_empty() || self.old_password.is_empty() {
            return Err(ValidationError::EmptyPassword);
        }
        if self.new_password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(new: &str, confirm: &str) -> PasswordChange {
        PasswordChange {
            old_password: "old-secret".into(),
            new_password: new.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        assert_eq!(
            change("abc12345", "abc1234").validate(),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn empty_password_is_rejected() {
        assert_eq!(change("", "").validate(), Err(ValidationError::EmptyPassword));
    }

    #[test]
    fn confirmation_is_not_sent() {
        let body = serde_json::to_value(change("abc12345", "abc12345")).unwrap();
        assert!(body.get("confirmPassword").is_none());
        assert_eq!(body["newPassword"], "abc12345");
    }

    #[test]
    fn debug_hides_passwords() {
        let rendered = format!("{:?}", change("abc12345", "abc12345"));
        assert!(!rendered.contains("abc12345"));
    }
}
