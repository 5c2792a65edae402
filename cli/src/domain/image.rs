//! Registry mode and image references

/// Literal used in place of a registry path when none is configured
pub const IMAGES_REPO_PLACEHOLDER: &str = "IMAGES_REPO";

/// Alias that expands to the local minikube registry
const MINIKUBE_ALIAS: &str = ":minikube";

/// Selected once per invocation from the registry path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryMode {
    WithoutRegistry,
    WithRegistry(String),
}

impl RegistryMode {
    /// Blank registry path selects `WithoutRegistry`.
    pub fn from_path(path: &str) -> Self {
        let path = path.trim().trim_end_matches('/');
        if path.is_empty() {
            Self::WithoutRegistry
        } else {
            Self::WithRegistry(path.to_string())
        }
    }

    /// Registry path as written into the values document
    pub fn display_path(&self) -> &str {
        match self {
            Self::WithoutRegistry => IMAGES_REPO_PLACEHOLDER,
            Self::WithRegistry(path) => path,
        }
    }

    /// `<registry>/<image>`, or `IMAGES_REPO/<image>` without a registry
    pub fn repository(&self, image_name: &str) -> String {
        format!("{}/{}", self.display_path(), image_name)
    }
}

/// Expand the images repo flag for `project`.
///
/// `:minikube` becomes `localhost:5000/<project>`; anything else is passed
/// through trimmed.
pub fn resolve_registry_path(flag: Option<&str>, project: &str) -> String {
    match flag.map(str::trim) {
        Some(MINIKUBE_ALIAS) => format!("localhost:5000/{}", project),
        Some(path) => path.to_string(),
        None => String::new(),
    }
}

/// Registry host part of an image reference
///
/// # Examples
/// - `registry.example.com/demo/web:v1` -> `registry.example.com`
/// - `localhost:5000/demo` -> `localhost:5000`
/// - `myuser/app` -> `docker.io`
pub fn registry_host(reference: &str) -> String {
    match reference.split_once('/') {
        Some((first, _)) if first.contains('.') || first.contains(':') || first == "localhost" => {
            first.to_string()
        }
        _ => "docker.io".to_string(),
    }
}
