use async_trait::async_trait;

use crate::Error;

/// Outbound-mail collaborator the access flow depends on. Implementations
/// render and deliver the message; the service only supplies the raw code and
/// the manage link.
#[async_trait]
pub trait AccessMailer: Send + Sync + 'static {
    async fn send_access_code(
        &self,
        to: &str,
        code: &str,
        manage_url: &str,
        expires_minutes: i64,
    ) -> Result<(), Error>;
}
