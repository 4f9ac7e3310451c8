/// Authenticated user as supplied by the external identity provider.
///
/// Sessions without an identity run as guests: scored locally and never
/// reported to the persistence service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub email: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            email,
        }
    }
}
