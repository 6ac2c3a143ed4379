use std::error::Error as StdError;

use crate::debug_mode_overrides;
use crate::facility_overrides;
use crate::IdentifiesComponent;
use crate::Result;
use crate::StatusCode;

/// Resolves the facility id a component's errors should carry: the ambient
/// override if one is configured, else the component's compiled-in default.
pub fn resolved_facility(
    component: &impl IdentifiesComponent,
    default_facility: u16,
) -> u16 {
    facility_overrides()
        .try_get_override(&component.component_identity())
        .ok()
        .flatten()
        .unwrap_or(default_facility)
}

/// Whether the deployed application enabled debug-mode diagnostics for the
/// component. Defaults to off on a miss.
pub fn debug_mode_enabled(component: &impl IdentifiesComponent) -> bool {
    debug_mode_overrides()
        .try_get_override(&component.component_identity())
        .ok()
        .flatten()
        .unwrap_or(false)
}

/// The base error a component raises: a vendor status code, a message and
/// an optional underlying cause.
#[derive(Debug, thiserror::Error)]
#[error("{message} [{code}]")]
pub struct CodedError {
    code: StatusCode,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl CodedError {
    pub fn new(
        code: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error whose facility id is resolved through the ambient
    /// override cache, falling back to `default_facility` on a miss.
    pub fn for_component(
        component: &impl IdentifiesComponent,
        default_facility: u16,
        error_id: u16,
        message: impl Into<String>,
    ) -> Result<Self> {
        let facility = resolved_facility(component, default_facility);
        Ok(Self::new(StatusCode::new(facility, error_id)?, message))
    }

    pub fn with_source(
        mut self,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Renders the message for display, honoring the component's debug-mode
    /// override: with debug mode on, the status code and the full cause
    /// chain are appended.
    pub fn detailed_message(
        &self,
        component: &impl IdentifiesComponent,
    ) -> String {
        if !debug_mode_enabled(component) {
            return self.message.clone();
        }

        let mut rendered = format!("{} [{}]", self.message, self.code);
        let mut cause = self.source.as_deref().map(|e| e as &dyn StdError);
        while let Some(err) = cause {
            rendered.push_str(" <- ");
            rendered.push_str(&err.to_string());
            cause = err.source();
        }
        rendered
    }
}
