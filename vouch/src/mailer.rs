use async_trait::async_trait;
use vouch_core::{AccessMailer, Error, error::StorageError};
use vouch_mailer::{AccessCodeEmail, Mailer, MailerConfig, TemplateContext};

/// [`AccessMailer`] backed by the vouch-mailer transports.
pub struct VouchMailerService {
    transport: Box<dyn Mailer>,
    config: MailerConfig,
}

impl VouchMailerService {
    pub fn new(config: MailerConfig) -> Result<Self, Error> {
        let transport = config
            .build_transport()
            .map_err(|e| Error::Storage(StorageError::Backend(e.to_string())))?;

        Ok(Self { transport, config })
    }

    pub fn from_env() -> Result<Self, Error> {
        let config =
            MailerConfig::from_env().map_err(|e| Error::Storage(StorageError::Backend(e.to_string())))?;
        Self::new(config)
    }

    /// Use a specific transport, e.g. the in-memory one in tests.
    pub fn with_transport(config: MailerConfig, transport: Box<dyn Mailer>) -> Self {
        Self { transport, config }
    }
}

#[async_trait]
impl AccessMailer for VouchMailerService {
    async fn send_access_code(
        &self,
        to: &str,
        code: &str,
        manage_url: &str,
        expires_minutes: i64,
    ) -> Result<(), Error> {
        let context = TemplateContext {
            site_name: self.config.site_name.clone(),
            site_url: self.config.site_url.clone(),
        };

        let email = AccessCodeEmail::build(
            &self.config.get_from_address(),
            to,
            code,
            manage_url,
            expires_minutes,
            &context,
        )
        .map_err(|e| Error::Storage(StorageError::Backend(e.to_string())))?;

        self.transport
            .send_email(email)
            .await
            .map_err(|e| Error::Storage(StorageError::Backend(e.to_string())))
    }
}
