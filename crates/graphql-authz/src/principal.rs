use std::fmt;

/// Role value clients use to explicitly ask for anonymous access.
pub const ANONYMOUS_MARKER: &str = "*";

/// Subject sent to the policy for anonymous requests, unless configured otherwise.
pub const DEFAULT_ANONYMOUS_SUBJECT: &str = "anonymous";

/// The identity a GraphQL request is executed for.
///
/// Insert it into the request data, a request without one is anonymous:
///
/// ```
/// use graphql_authz::Principal;
///
/// let request = async_graphql::Request::new("{ project(id: 2) { id } }")
///     .data(Principal::from_role(Some("user")));
/// # let _ = request;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Principal {
    #[default]
    Anonymous,
    Named(String),
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    /// Builds the principal from the role found in the request context, if any.
    ///
    /// A missing role, an empty one or the [`ANONYMOUS_MARKER`] all resolve to
    /// [`Principal::Anonymous`].
    pub fn from_role(role: Option<&str>) -> Self {
        match role.map(str::trim) {
            None | Some("") | Some(ANONYMOUS_MARKER) => Self::Anonymous,
            Some(role) => Self::Named(role.to_owned()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// The policy subject for this principal.
    pub fn subject<'a>(&'a self, anonymous_subject: &'a str) -> &'a str {
        match self {
            Self::Anonymous => anonymous_subject,
            Self::Named(name) => name,
        }
    }
}

impl From<String> for Principal {
    fn from(role: String) -> Self {
        Self::from_role(Some(&role))
    }
}

impl From<&str> for Principal {
    fn from(role: &str) -> Self {
        Self::from_role(Some(role))
    }
}

impl From<Option<String>> for Principal {
    fn from(role: Option<String>) -> Self {
        Self::from_role(role.as_deref())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subject(DEFAULT_ANONYMOUS_SUBJECT))
    }
}
