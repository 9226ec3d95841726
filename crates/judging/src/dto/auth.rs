use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_confirmation"))]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[serde(rename = "newPassword")]
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,

    #[serde(rename = "confirmNewPassword", skip_serializing)]
    pub confirm_new_password: String,
}

fn validate_confirmation(request: &ChangePasswordRequest) -> Result<(), ValidationError> {
    if request.new_password != request.confirm_new_password {
        let mut error = ValidationError::new("password_mismatch");
        error.message = Some("Passwords do not match".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(new_password: &str, confirm: &str) -> ChangePasswordRequest {
        ChangePasswordRequest {
            current_password: "old-secret".to_string(),
            new_password: new_password.to_string(),
            confirm_new_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_change_password_validation() {
        assert!(request("new-secret", "new-secret").validate().is_ok());
        assert!(request("new-secret", "other").validate().is_err());
        assert!(request("", "").validate().is_err());
    }

    #[test]
    fn test_confirmation_is_not_sent() {
        let json = serde_json::to_value(request("a", "a")).unwrap();
        assert!(json.get("confirmNewPassword").is_none());
        assert_eq!(json["newPassword"], "a");
    }
}
