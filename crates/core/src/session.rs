//! Session issuance policy and principal tags.

/// Issuer tag for ordinary user sessions. The only principal class today.
pub const ISSUER_USER: &str = "user";

/// How many live sessions a single subject may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPolicy {
    /// Issuing a session revokes every earlier session of the same subject,
    /// and logging out ends all of them.
    #[default]
    Single,
    /// Sessions are independent; logout ends only the presented one.
    Multiple,
}

impl SessionPolicy {
    /// Map the `MULTIPLE_LOGIN` deployment flag onto a policy.
    pub fn from_multiple_login(multiple_login: bool) -> Self {
        if multiple_login {
            Self::Multiple
        } else {
            Self::Single
        }
    }

    pub fn is_single(self) -> bool {
        self == Self::Single
    }
}
