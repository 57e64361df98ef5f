use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::errors::ContentScriptError;
use crate::models::usage::UsageSummary;

const HOME_PAGE: &str = "home";
const GENERATE_PAGE: &str = "generate";
const DASHBOARD_PAGE: &str = "dashboard";

#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutBanner {
    Paid,
    Canceled,
}

pub struct Pages {
    pub templates: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, ContentScriptError> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(false);

        templates
            .register_partial("head", include_str!("./pages/head.hbs"))
            .map_err(|e| ContentScriptError::TemplateError(e.to_string()))?;
        templates
            .register_partial("header", include_str!("./pages/header.hbs"))
            .map_err(|e| ContentScriptError::TemplateError(e.to_string()))?;

        for (name, template) in [
            (HOME_PAGE, include_str!("./pages/home.hbs")),
            (GENERATE_PAGE, include_str!("./pages/generate.hbs")),
            (DASHBOARD_PAGE, include_str!("./pages/dashboard.hbs")),
        ] {
            templates
                .register_template_string(name, template)
                .map_err(|e| ContentScriptError::TemplateError(e.to_string()))?;
        }

        Ok(Self { templates })
    }

    pub fn render_home(&self) -> Result<String, ContentScriptError> {
        Ok(self.templates.render(HOME_PAGE, &json!({ "title": "ContentScript AI" }))?)
    }

    pub fn render_generate(&self, banner: Option<CheckoutBanner>) -> Result<String, ContentScriptError> {
        let ctx = json!({
            "title": "Generate Script",
            "paid": matches!(banner, Some(CheckoutBanner::Paid)),
            "canceled": matches!(banner, Some(CheckoutBanner::Canceled)),
        });

        Ok(self.templates.render(GENERATE_PAGE, &ctx)?)
    }

    /// `usage` is `None` when the caller has no identity to count against.
    pub fn render_dashboard(&self, usage: Option<UsageSummary>) -> Result<String, ContentScriptError> {
        let ctx = json!({
            "title": "Dashboard",
            "usage": usage,
        });

        Ok(self.templates.render(DASHBOARD_PAGE, &ctx)?)
    }
}
