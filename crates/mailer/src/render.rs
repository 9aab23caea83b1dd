use palmsure_core::{ContactSubmission, QuoteDetails, Submission};
use tera::{Context, Tera};
use thiserror::Error;
use tracing::warn;

const CONTACT_TEMPLATE: &str = "contact.html";
const QUOTE_TEMPLATE: &str = "quote.html";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("email template rendering failed: {0}")]
    Template(#[from] tera::Error),
}

/// Renders submission bodies through tera. The `.html` template names keep
/// autoescaping on, so submitted field values cannot inject markup into the
/// notification email.
pub struct EmailRenderer {
    templates: Tera,
}

impl Default for EmailRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailRenderer {
    /// Loads templates from `templates/email/` and registers embedded copies
    /// for any name the filesystem did not provide.
    pub fn new() -> Self {
        let mut templates = match Tera::new("templates/email/**/*") {
            Ok(templates) => templates,
            Err(error) => {
                warn!(error = %error, "failed to load email templates from filesystem, using embedded templates");
                Tera::default()
            }
        };

        let embedded = [
            (CONTACT_TEMPLATE, include_str!("../../../templates/email/contact.html")),
            (QUOTE_TEMPLATE, include_str!("../../../templates/email/quote.html")),
        ];
        for (name, raw) in embedded {
            if !templates.get_template_names().any(|registered| registered == name) {
                templates.add_raw_template(name, raw).ok();
            }
        }

        Self { templates }
    }

    /// Test seam: render through a caller-supplied template set.
    pub fn from_tera(templates: Tera) -> Self {
        Self { templates }
    }

    pub fn render(&self, submission: &Submission) -> Result<String, RenderError> {
        match submission {
            Submission::Contact(contact) => {
                let mut context = Context::new();
                context.insert("full_name", &contact.full_name);
                context.insert("email", &contact.email);
                context.insert("contact_number", &contact.contact_number);
                context.insert("message", &contact.message);
                Ok(self.templates.render(CONTACT_TEMPLATE, &context)?)
            }
            Submission::Quote(quote) => {
                let mut context = Context::new();
                context.insert("first_name", &quote.personal.first_name);
                context.insert("last_name", &quote.personal.last_name);
                context.insert("email", &quote.personal.email);
                context.insert("phone", &quote.personal.phone);
                context.insert("category", quote.details.category().as_str());
                match &quote.details {
                    QuoteDetails::Property(details) => {
                        context.insert("address", &details.address);
                        context.insert("value", &details.value);
                    }
                    QuoteDetails::Vehicle(details) => {
                        context.insert("make", &details.make);
                        context.insert("model", &details.model);
                        context.insert("year", &details.year);
                    }
                    QuoteDetails::Business(details) => {
                        context.insert("name", &details.name);
                        context.insert("industry", &details.industry);
                    }
                }
                Ok(self.templates.render(QUOTE_TEMPLATE, &context)?)
            }
        }
    }

    /// Renders a fixed contact body to prove the template set is usable.
    pub fn probe(&self) -> Result<(), RenderError> {
        let probe = Submission::Contact(ContactSubmission {
            full_name: "probe".to_string(),
            email: "probe@localhost.invalid".to_string(),
            contact_number: String::new(),
            message: "probe".to_string(),
        });
        self.render(&probe).map(|_| ())
    }
}
