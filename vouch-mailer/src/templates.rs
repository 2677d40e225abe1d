use askama::Template;
use serde::{Deserialize, Serialize};

/// Site-level values threaded into every outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub site_name: String,
    pub site_url: String,
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self {
            site_name: "Your Site".to_string(),
            site_url: "https://yoursite.com".to_string(),
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Access code - {{ site_name }}</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 20px; background-color: #f4f4f4; }
        .container { max-width: 600px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .header { text-align: center; margin-bottom: 30px; }
        .code { font-size: 32px; letter-spacing: 8px; font-family: monospace; text-align: center; background: #f8f9fa; padding: 16px; border-radius: 4px; }
        .footer { margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; font-size: 12px; color: #666; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{{ site_name }}</h1>
        </div>

        <h2>Manage Your Endorsement</h2>

        <p>Hello,</p>

        <p>Use the code below to edit or remove the endorsement you left on {{ site_name }}. The code expires in {{ expires_minutes }} minutes.</p>

        <p class="code">{{ code }}</p>

        <p>Enter it on the endorsement page:</p>
        <p style="word-break: break-all; background: #f8f9fa; padding: 10px; border-radius: 4px; font-family: monospace;">{{ manage_url }}</p>

        <p>If you didn't request this email, you can safely ignore it.</p>

        <div class="footer">
            <p>This email was sent by {{ site_name }} because someone asked to manage an endorsement associated with this address.</p>
        </div>
    </div>
</body>
</html>
"#,
    ext = "html"
)]
pub struct AccessCodeTemplate {
    pub site_name: String,
    pub code: String,
    pub manage_url: String,
    pub expires_minutes: i64,
}

impl AccessCodeTemplate {
    /// Plain-text alternative for clients that don't render HTML.
    pub fn render_text(&self) -> String {
        format!(
            "Manage your endorsement on {site}\n\n\
             Your access code is: {code}\n\n\
             It expires in {minutes} minutes. Enter it here:\n{url}\n\n\
             If you didn't request this email, you can safely ignore it.\n",
            site = self.site_name,
            code = self.code,
            minutes = self.expires_minutes,
            url = self.manage_url,
        )
    }
}
