//! Template renderer.

use crate::config::UpdaterConfig;
use crate::pull_requests::SkippedUpdate;
use crate::updates::{Update, UpdateGroup};
use crate::version::normalise_version;
use chrono::NaiveDate;
use handlebars::{no_escape, Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::{json, Value};

const PR_BODY_TEMPLATE: &str = r"{{#if single}}Updates the **{{name_with_owner}}** extension from `{{current_version}}` to `{{version}}`.
{{else}}Updates {{count}} Quarto extensions.
{{/if}}
| Extension | From | To | Type | Release |
| --- | --- | --- | --- | --- |
{{#each updates}}| {{#if homepage_url}}[{{id}}]({{homepage_url}}){{else}}{{id}}{{/if}} | `{{current_version}}` | `{{latest_version}}` | {{magnitude}} | {{#if release_url}}[{{latest_version}}]({{release_url}}){{else}}-{{/if}} |
{{/each}}
{{#each updates}}{{#if description}}
- **{{id}}**: {{description}}{{/if}}{{/each}}
{{#if skipped}}
### Skipped

{{#each skipped}}- **{{id}}** `{{latest_version}}`: {{reason}}
{{/each}}{{/if}}
---

Created by quarto-extension-updater on {{date}}.
";

/// Creates a configured Handlebars registry with custom helpers.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
/// - `eq` helper for equality comparisons
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping for markdown output
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs.register_helper("eq", Box::new(eq_helper));

    hbs
}

/// Usage: `{{#if (eq variable "value")}}...{{/if}}`
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param1 = h.param(0).and_then(|v| v.value().as_str());
    let param2 = h.param(1).and_then(|v| v.value().as_str());

    let result = match (param1, param2) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };

    out.write(if result { "true" } else { "" })?;
    Ok(())
}

/// Renders branch names, titles, commit messages and PR bodies for update
/// groups.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the branch name for a group.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn branch_name(
        &self,
        config: &UpdaterConfig,
        group: &UpdateGroup,
        date: NaiveDate,
    ) -> Result<String, super::TemplateError> {
        let template = if group.is_single() {
            &config.branch_name_format
        } else {
            &config.group_branch_name_format
        };
        let name =
            self.render_template("branch name", template, &group_context(config, group, date))?;
        Ok(sanitise_branch_name(&name))
    }

    /// Renders the pull request title for a group.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn pr_title(
        &self,
        config: &UpdaterConfig,
        group: &UpdateGroup,
        date: NaiveDate,
    ) -> Result<String, super::TemplateError> {
        let template = if group.is_single() {
            &config.pr_title_format
        } else {
            &config.group_pr_title_format
        };
        Ok(self
            .render_template(
                "pull request title",
                template,
                &group_context(config, group, date),
            )?
            .trim()
            .to_string())
    }

    /// Renders the commit message for the updates that were applied.
    ///
    /// The title comes from the configured format; the body lists every
    /// applied update.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn commit_message(
        &self,
        config: &UpdaterConfig,
        applied: &UpdateGroup,
        date: NaiveDate,
    ) -> Result<String, super::TemplateError> {
        let template = if applied.is_single() {
            &config.commit_title_format
        } else {
            &config.group_commit_title_format
        };
        let title = self.render_template(
            "commit message",
            template,
            &group_context(config, applied, date),
        )?;

        let mut message = title.trim().to_string();
        message.push_str("\n\n");
        for update in applied.updates() {
            message.push_str(&format!(
                "- {}: {} -> {}\n",
                update.extension_id(),
                update.current_version,
                update.latest_version
            ));
        }
        Ok(message)
    }

    /// Renders the markdown pull request body.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn pr_body(
        &self,
        config: &UpdaterConfig,
        applied: &UpdateGroup,
        skipped: &[SkippedUpdate],
        date: NaiveDate,
    ) -> Result<String, super::TemplateError> {
        let mut data = group_context(config, applied, date);
        data["skipped"] = Value::Array(
            skipped
                .iter()
                .map(|skip| {
                    json!({
                        "id": skip.update.extension_id(),
                        "latest_version": skip.update.latest_version,
                        "reason": single_line(&skip.reason),
                    })
                })
                .collect(),
        );

        self.render_template("pull request body", PR_BODY_TEMPLATE, &data)
    }

    /// Renders a template with the given data.
    fn render_template(
        &self,
        what: &'static str,
        template: &str,
        data: &Value,
    ) -> Result<String, super::TemplateError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|source| super::TemplateError::Render { what, source })
    }
}

/// Builds the template context for a group. Every field is always present so
/// strict mode only rejects unknown names.
fn group_context(config: &UpdaterConfig, group: &UpdateGroup, date: NaiveDate) -> Value {
    let first = group.first();
    json!({
        "prefix": config.branch_prefix,
        "owner": first.owner,
        "name": first.name,
        "name_with_owner": first.extension_id(),
        "repository": first.name_with_owner,
        "version": normalise_version(&first.latest_version),
        "current_version": normalise_version(&first.current_version),
        "date": date.format("%Y-%m-%d").to_string(),
        "count": group.len(),
        "single": group.is_single(),
        "updates": group.updates().iter().map(update_context).collect::<Vec<_>>(),
        "skipped": [],
    })
}

fn update_context(update: &Update) -> Value {
    json!({
        "id": update.extension_id(),
        "owner": update.owner,
        "name": update.name,
        "repository": update.name_with_owner,
        "current_version": update.current_version,
        "latest_version": update.latest_version,
        "magnitude": update.magnitude().map_or("unknown", |m| m.as_str()),
        "homepage_url": update.homepage_url.clone().unwrap_or_default(),
        "release_url": update.release_url.clone().unwrap_or_default(),
        "description": update.description.as_deref().map(single_line).unwrap_or_default(),
    })
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replaces characters git rejects in reference names.
fn sanitise_branch_name(name: &str) -> String {
    let mapped: String = name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    mapped.replace("..", ".").replace("@{", "-")
}
