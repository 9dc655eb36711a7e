use validator::ValidateEmail;

/// A guest address that is safe to put in a `Reply-To` header.
///
/// The submitted `email` field is free text as far as the notification is
/// concerned; it is rendered whatever it contains. Only when it also parses as
/// a `GuestEmail` do the hosts get to reply to it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestEmail(String);

impl GuestEmail {
    pub fn parse(email: &str) -> Result<Self, String> {
        let email = email.trim().to_string();
        ValidateEmail::validate_email(&email)
            .then(|| Self(email.clone()))
            .ok_or(format!("Invalid email: {email:?}"))
    }
}

impl AsRef<str> for GuestEmail {
    fn as_ref(&self) -> &str { &self.0 }
}
