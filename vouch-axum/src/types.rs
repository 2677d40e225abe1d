use serde::{Deserialize, Serialize};
use vouch_core::Environment;

/// Name of the session cookie issued on code verification.
pub const SESSION_COOKIE: &str = "vouch_access";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestCodeRequest {
    pub endorsement_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    pub endorsement_id: String,
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEndorsementRequest {
    pub author_name: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub success: bool,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ConnectionInfo {
    /// Rate-limit key for this caller. Requests with no resolvable address
    /// share one bucket rather than escaping the limits.
    pub fn ip_key(&self) -> &str {
        self.ip.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: CookieSameSite,
    pub path: String,
}

#[derive(Debug, Clone, Default)]
pub enum CookieSameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl CookieSameSite {
    fn as_str(&self) -> &'static str {
        match self {
            CookieSameSite::Strict => "Strict",
            CookieSameSite::Lax => "Lax",
            CookieSameSite::None => "None",
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE.to_string(),
            http_only: true,
            secure: true,
            same_site: CookieSameSite::Lax,
            path: "/".to_string(),
        }
    }
}

impl CookieConfig {
    pub fn development() -> Self {
        Self {
            secure: false,
            ..Self::default()
        }
    }

    /// `Secure` in production, plain HTTP allowed in development.
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            secure: environment.is_production(),
            ..Self::default()
        }
    }

    /// `Set-Cookie` value carrying a fresh session token.
    pub fn session_cookie(&self, token: &str, max_age_seconds: i64) -> String {
        self.render(token, max_age_seconds)
    }

    /// `Set-Cookie` value that removes the session cookie on the client.
    pub fn clear_cookie(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age_seconds: i64) -> String {
        let mut cookie = format!(
            "{}={value}; Max-Age={max_age_seconds}; Path={}; SameSite={}",
            self.name,
            self.path,
            self.same_site.as_str()
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = CookieConfig::default().session_cookie("tok.sig", 1800);
        assert!(cookie.starts_with("vouch_access=tok.sig"));
        assert!(cookie.contains("Max-Age=1800"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn test_development_cookie_is_not_secure() {
        let cookie = CookieConfig::development().session_cookie("tok", 1800);
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = CookieConfig::default().clear_cookie();
        assert!(cookie.starts_with("vouch_access=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_for_environment() {
        assert!(CookieConfig::for_environment(Environment::Production).secure);
        assert!(!CookieConfig::for_environment(Environment::Development).secure);
    }
}
