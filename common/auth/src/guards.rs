use axum::http::StatusCode;

use crate::roles::Role;

#[derive(Debug, Clone)]
pub enum GuardError {
    Forbidden { required: Vec<Role> },
}

impl GuardError {
    pub fn into_response(self) -> (StatusCode, String) {
        match self {
            GuardError::Forbidden { required } => (
                StatusCode::FORBIDDEN,
                if required.is_empty() {
                    "Insufficient role".to_string()
                } else {
                    format!(
                        "Insufficient role. Required one of: {}",
                        required
                            .iter()
                            .map(|role| role.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                },
            ),
        }
    }
}

impl From<GuardError> for (StatusCode, String) {
    fn from(value: GuardError) -> Self {
        value.into_response()
    }
}

/// Pure predicate gate: the caller's role must be a member of the allowed
/// set. An empty set allows everyone (the route is then only auth-gated).
pub fn ensure_role(role: Role, allowed: &[Role]) -> Result<(), GuardError> {
    if allowed.is_empty() || allowed.contains(&role) {
        Ok(())
    } else {
        Err(GuardError::Forbidden {
            required: allowed.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_of_allowed_set_passes() {
        ensure_role(Role::Staff, &[Role::Staff]).expect("staff allowed");
        ensure_role(Role::Student, &[Role::Student, Role::Staff]).expect("student allowed");
    }

    #[test]
    fn outsider_is_forbidden() {
        let err = ensure_role(Role::Student, &[Role::Staff]).expect_err("student rejected");
        let GuardError::Forbidden { required } = err;
        assert_eq!(required, vec![Role::Staff]);
    }

    #[test]
    fn empty_set_allows_any_authenticated_caller() {
        ensure_role(Role::Student, &[]).expect("allowed");
    }

    #[test]
    fn forbidden_renders_403_naming_required_roles() {
        let (status, message) = ensure_role(Role::Student, &[Role::Staff])
            .expect_err("rejected")
            .into_response();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(message.contains("staff"));
    }
}
