//! Environment and Kubernetes namespace resolution

use super::slug;
use crate::config::ProjectConfig;
use crate::error::ConfigError;

/// Literal substituted for a blank environment; chart templates match on it
pub const ENVIRONMENT_PLACEHOLDER: &str = "ENV";

/// Template used when the environment is the placeholder and nothing is configured
pub const DEFAULT_NAMESPACE_TEMPLATE: &str = "[[ project ]]-[[ env ]]";

/// Blank environment becomes the `ENV` placeholder.
pub fn resolve_environment(flag: Option<&str>) -> String {
    match flag.map(str::trim) {
        Some(env) if !env.is_empty() => env.to_string(),
        _ => ENVIRONMENT_PLACEHOLDER.to_string(),
    }
}

/// Substitute `[[ project ]]` and `[[ env ]]` in a namespace template.
///
/// Whitespace inside the brackets is optional: `[[project]]` works too.
pub fn render_template(template: &str, project: &str, environment: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("[[") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("]]") {
            Some(end) => {
                match after[..end].trim() {
                    "project" => out.push_str(project),
                    "env" => out.push_str(environment),
                    _ => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Resolve the namespace for `environment`.
///
/// Priority:
/// 1. `--namespace` flag
/// 2. `deploy.environments.<env>.namespace`
/// 3. `deploy.namespace`
/// 4. `[[ project ]]-[[ env ]]`, only for the `ENV` placeholder
pub fn resolve_namespace(
    flag: Option<&str>,
    environment: &str,
    config: &ProjectConfig,
) -> Result<String, ConfigError> {
    if let Some(namespace) = flag.map(str::trim).filter(|ns| !ns.is_empty()) {
        return slugify(namespace, namespace);
    }

    let template = match config.deploy.namespace_template(environment) {
        Some(template) => template,
        None if environment == ENVIRONMENT_PLACEHOLDER => DEFAULT_NAMESPACE_TEMPLATE,
        None => {
            return Err(ConfigError::NamespaceUnresolved {
                environment: environment.to_string(),
            })
        }
    };

    let rendered = render_template(template, &config.project, environment);
    slugify(&rendered, template)
}

fn slugify(raw: &str, template: &str) -> Result<String, ConfigError> {
    let namespace = slug::kubernetes_namespace(raw);
    if namespace.is_empty() {
        return Err(ConfigError::InvalidNamespace {
            template: template.to_string(),
        });
    }
    Ok(namespace)
}
