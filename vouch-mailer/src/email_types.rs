use askama::Template;

use crate::{
    Email, MailerError,
    templates::{AccessCodeTemplate, TemplateContext},
};

pub struct AccessCodeEmail;

impl AccessCodeEmail {
    pub fn build(
        from: &str,
        to: &str,
        code: &str,
        manage_url: &str,
        expires_minutes: i64,
        context: &TemplateContext,
    ) -> Result<Email, MailerError> {
        let template = AccessCodeTemplate {
            site_name: context.site_name.clone(),
            code: code.to_string(),
            manage_url: manage_url.to_string(),
            expires_minutes,
        };

        let html_body = template.render()?;
        let text_body = template.render_text();

        Email::builder()
            .from(from)
            .to(to)
            .subject(format!(
                "Your access code for {}",
                context.site_name
            ))
            .html_body(html_body)
            .text_body(text_body)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_access_code_email() {
        let context = TemplateContext {
            site_name: "Test Site".to_string(),
            site_url: "https://test.com".to_string(),
        };

        let email = AccessCodeEmail::build(
            "noreply@test.com",
            "visitor@example.com",
            "123456",
            "https://test.com/endorsements/end_abc/manage",
            10,
            &context,
        )
        .unwrap();

        assert_eq!(email.to, "visitor@example.com");
        assert!(email.subject.contains("Test Site"));
        assert!(email.html_body.unwrap().contains("123456"));
        assert!(email.text_body.unwrap().contains("123456"));
    }
}
