/// Who a request is counted against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    /// Signed-in user of the auth provider.
    User(String),
    /// Anonymous visitor tracked by the signed session cookie.
    Visitor,
}

impl Identity {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::User(id) => Some(id),
            Identity::Visitor => None,
        }
    }
}
