//! Server-rendered pages: the home page (upload widget, search form, résumé
//! analysis) and the results page. Every page renders the tab's pending
//! toasts through the shared `base.html` layout.

pub mod home;
pub mod results;

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::errors::AppError;

/// Compiled page templates.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../../templates/base.html"))?;
        env.add_template("home.html", include_str!("../../templates/home.html"))?;
        env.add_template("results.html", include_str!("../../templates/results.html"))?;
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, view: S) -> Result<Html<String>, AppError> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(view)?))
    }
}
