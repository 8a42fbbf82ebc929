//! Page templates: token substitution and where the rendered copies go.
//!
//! A template is an HTML file whose placeholders are plain token names such as
//! `lead_string`. Rendering replaces every occurrence of each token, in the
//! order of the [`TemplateVariables`], and stores the result under
//! `<base>-copy.html` next to the source.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use url::Url;

use lantern_types::TemplateVariables;
use lantern_utils::{AtomicWriteOptions, FileSyncPolicy, PersistMode, atomic_write_with_options};

use crate::errors::RenderError;

const COPY_SUFFIX: &str = "-copy.html";

/// Something the presentation surface can be pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentHandle(String);

impl DocumentHandle {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rendered page ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub template: String,
    pub output_name: String,
    pub handle: DocumentHandle,
    pub body: String,
}

/// Where templates are read from and rendered pages are written to.
pub trait TemplateStore {
    fn load(&self, name: &str) -> Result<String, RenderError>;
    fn store(&self, output_name: &str, body: &str) -> Result<DocumentHandle, RenderError>;
}

/// Templates kept in a directory on disk; copies land beside them.
#[derive(Debug, Clone)]
pub struct DirTemplateStore {
    root: PathBuf,
}

impl DirTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateStore for DirTemplateStore {
    fn load(&self, name: &str) -> Result<String, RenderError> {
        let path = self.root.join(name);
        fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                RenderError::NotFound {
                    name: name.to_string(),
                }
            } else {
                RenderError::Read { path, source }
            }
        })
    }

    fn store(&self, output_name: &str, body: &str) -> Result<DocumentHandle, RenderError> {
        let path = self.root.join(output_name);
        let options = AtomicWriteOptions {
            file_sync: FileSyncPolicy::SkipSync,
            mode: PersistMode::Default,
        };
        atomic_write_with_options(&path, body.as_bytes(), options).map_err(|source| {
            RenderError::Write {
                path: path.clone(),
                source,
            }
        })?;
        let location = Url::from_file_path(&path)
            .map_or_else(|()| path.display().to_string(), |url| url.to_string());
        Ok(DocumentHandle::new(location))
    }
}

/// Templates held in memory. Rendered copies are kept for inspection.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: HashMap<String, String>,
    outputs: RefCell<HashMap<String, String>>,
}

impl MemoryTemplateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.templates.insert(name.into(), body.into());
        self
    }

    #[must_use]
    pub fn output(&self, output_name: &str) -> Option<String> {
        self.outputs.borrow().get(output_name).cloned()
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load(&self, name: &str) -> Result<String, RenderError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| RenderError::NotFound {
                name: name.to_string(),
            })
    }

    fn store(&self, output_name: &str, body: &str) -> Result<DocumentHandle, RenderError> {
        self.outputs
            .borrow_mut()
            .insert(output_name.to_string(), body.to_string());
        Ok(DocumentHandle::new(format!("memory:{output_name}")))
    }
}

/// Replace every occurrence of each token, in variable order.
///
/// Later tokens see the output of earlier replacements.
#[must_use]
pub fn substitute(text: &str, vars: &TemplateVariables) -> String {
    vars.iter()
        .fold(text.to_string(), |acc, (token, value)| acc.replace(token, value))
}

/// `install0Censored.html` -> `install0Censored-copy.html`.
#[must_use]
pub fn output_name(template: &str) -> String {
    let base = template.find(".html").map_or(template, |idx| &template[..idx]);
    format!("{base}{COPY_SUFFIX}")
}

/// True for locations that point at a page this process wrote.
#[must_use]
pub fn is_rendered_copy(location: &str) -> bool {
    location.ends_with(COPY_SUFFIX)
}

/// Renders templates from a [`TemplateStore`].
pub struct TemplateRenderer {
    store: Box<dyn TemplateStore>,
    installation_title: String,
}

impl TemplateRenderer {
    pub fn new(store: Box<dyn TemplateStore>, installation_title: impl Into<String>) -> Self {
        Self {
            store,
            installation_title: installation_title.into(),
        }
    }

    /// Render `template` with `vars` and store the copy.
    ///
    /// `error_message` defaults to empty and `installation_title` is always
    /// set, so those tokens never leak through to the page.
    pub fn render(
        &self,
        template: &str,
        mut vars: TemplateVariables,
    ) -> Result<RenderedDocument, RenderError> {
        vars.ensure_render_defaults(&self.installation_title);
        let source = self.store.load(template)?;
        let body = substitute(&source, &vars);
        let output_name = output_name(template);
        let handle = self.store.store(&output_name, &body)?;
        tracing::debug!(template, output = %handle, "Rendered page");
        Ok(RenderedDocument {
            template: template.to_string(),
            output_name,
            handle,
            body,
        })
    }
}
