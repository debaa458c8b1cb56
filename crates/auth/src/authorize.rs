use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing role '{0}'")]
    MissingRole(String),
}

/// Whether the caller holds the required role.
///
/// - No IO
/// - No panics
/// - Fail-closed: a missing caller or missing role collection is `false`
pub fn has_required_role(caller: Option<&Principal>, required: &Role) -> bool {
    caller
        .and_then(Principal::roles)
        .is_some_and(|roles| roles.iter().any(|r| r.as_str() == required.as_str()))
}

/// [`has_required_role`] as a typed result, for use at the command boundary.
pub fn authorize(caller: Option<&Principal>, required: &Role) -> Result<(), AuthzError> {
    if has_required_role(caller, required) {
        Ok(())
    } else {
        Err(AuthzError::MissingRole(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserRef;
    use ledgerbot_core::UserId;
    use proptest::prelude::*;

    const STAFF: &str = "Staff 👷‍♂️";

    fn caller(roles: Option<Vec<&'static str>>) -> Principal {
        Principal::new(
            UserRef::new(UserId::from(1u64), "caller"),
            roles.map(|rs| rs.into_iter().map(Role::new).collect()),
        )
    }

    #[test]
    fn exact_role_name_grants_access() {
        let c = caller(Some(vec!["Member", STAFF]));
        assert!(has_required_role(Some(&c), &Role::new(STAFF)));
        assert_eq!(authorize(Some(&c), &Role::new(STAFF)), Ok(()));
    }

    #[test]
    fn near_miss_names_are_denied() {
        let c = caller(Some(vec!["Staff", "staff 👷‍♂️", "Staff 👷‍♂️ "]));
        assert!(!has_required_role(Some(&c), &Role::new(STAFF)));
        assert_eq!(
            authorize(Some(&c), &Role::new(STAFF)),
            Err(AuthzError::MissingRole(STAFF.to_string()))
        );
    }

    #[test]
    fn missing_caller_or_roles_fail_closed() {
        assert!(!has_required_role(None, &Role::new(STAFF)));
        assert!(!has_required_role(Some(&caller(None)), &Role::new(STAFF)));
        assert!(!has_required_role(Some(&caller(Some(vec![]))), &Role::new(STAFF)));
    }

    proptest! {
        #[test]
        fn granted_iff_some_role_matches(names in prop::collection::vec("[a-zA-Z ]{0,12}", 0..6)) {
            let required = Role::new("Treasurer");
            let c = Principal::new(
                UserRef::new(UserId::from(1u64), "caller"),
                Some(names.iter().cloned().map(Role::new).collect()),
            );
            let expected = names.iter().any(|n| n == "Treasurer");
            prop_assert_eq!(has_required_role(Some(&c), &required), expected);
        }
    }
}
