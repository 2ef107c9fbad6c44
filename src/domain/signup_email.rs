use validator::validate_email;

#[derive(Debug, Clone, serde::Serialize)]
pub struct SignupEmail(String);

impl SignupEmail {
    /// Accepts addresses of the shape `local@domain.tld`. The extra dot check
    /// on the domain keeps bare hostnames like `user@localhost` out of the
    /// waitlist.
    pub fn parse(email: String) -> Result<SignupEmail, String> {
        let has_dotted_domain = email
            .rsplit_once('@')
            .map(|(_, domain)| domain.contains('.'))
            .unwrap_or(false);

        if !validate_email(&email) || !has_dotted_domain {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(email))
    }
}

impl AsRef<str> for SignupEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
