use uuid::Uuid;

/// A registered user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    /// Identifier minted by the service at creation.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Password, stored as submitted.
    pub password: String,
}

impl User {
    /// Builds a new user with a freshly minted identifier.
    pub fn new(name: String, email: String, password: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password,
        }
    }
}

/// Partial update of a [`User`]. An empty field leaves the stored value untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UserPatch {
    /// Replacement name, or empty.
    pub name: String,
    /// Replacement email, or empty.
    pub email: String,
    /// Replacement password, or empty.
    pub password: String,
}

impl UserPatch {
    /// Overwrites the fields of `user` this patch carries.
    pub fn apply_to(self, user: &mut User) {
        if !self.name.is_empty() {
            user.name = self.name;
        }
        if !self.email.is_empty() {
            user.email = self.email;
        }
        if !self.password.is_empty() {
            user.password = self.password;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn user() -> User {
        User {
            id: Uuid::nil(),
            name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            password: "password1".to_string(),
        }
    }

    #[test]
    fn test_new_mints_distinct_ids() {
        let first = User::new(String::new(), String::new(), String::new());
        let second = User::new(String::new(), String::new(), String::new());
        assert_ne!(first.id, second.id);
    }

    #[rstest]
    #[case::empty(UserPatch::default(), user())]
    #[case::name_only(
        UserPatch { name: "Annie".to_string(), ..Default::default() },
        User { name: "Annie".to_string(), ..user() }
    )]
    #[case::email_and_password(
        UserPatch {
            email: "annie@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            ..Default::default()
        },
        User {
            email: "annie@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            ..user()
        }
    )]
    fn test_apply_to(#[case] patch: UserPatch, #[case] expected: User) {
        let mut actual = user();
        patch.apply_to(&mut actual);
        assert_eq!(actual, expected);
    }
}
