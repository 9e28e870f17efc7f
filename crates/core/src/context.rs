//! Runtime and test-time context contributions
//!
//! The generated client is represented by an explicit handle constructed
//! once at startup and threaded to every consumer. Unknown context-field
//! bindings are non-fatal: they render a warning with nearby valid names and
//! execution continues.

use crate::config::BridgeConfig;
use crate::suggest::suggestion_list;
use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Handle to the generated database client package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHandle {
    dir: PathBuf,
}

impl ClientHandle {
    pub fn from_config(config: &BridgeConfig, root: &Path) -> Self {
        Self {
            dir: config.resolved_client_dir(root),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Type declarations the host's type generation consumes.
    pub fn typegen_source(&self) -> PathBuf {
        self.dir.join("index.d.ts")
    }
}

/// A declaration source registered with the host's type generation.
#[derive(Debug, Clone)]
pub struct TypegenSource {
    pub source: PathBuf,
    pub alias: String,
}

#[derive(Debug, Clone)]
pub struct TypegenConfig {
    pub sources: Vec<TypegenSource>,
    pub output: PathBuf,
}

/// Runtime contribution: the client context field plus typegen metadata.
pub struct RuntimeContribution {
    client: Arc<ClientHandle>,
    /// Context field name -> rendered type.
    fields: BTreeMap<String, String>,
    pub typegen: TypegenConfig,
}

impl RuntimeContribution {
    pub fn new(client: Arc<ClientHandle>, root: &Path) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("db".to_string(), "Prisma.PrismaClient".to_string());

        let typegen = TypegenConfig {
            sources: vec![TypegenSource {
                source: client.typegen_source(),
                alias: "Prisma".to_string(),
            }],
            output: root.join("node_modules/@types/typegen-nexus-prisma/index.d.ts"),
        };

        Self {
            client,
            fields,
            typegen,
        }
    }

    pub fn client(&self) -> &Arc<ClientHandle> {
        &self.client
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Resolve a context field binding. Unknown names render a warning and
    /// yield `None`; the caller carries on.
    pub fn resolve_field(&self, type_name: &str, field_name: &str) -> Option<&str> {
        match self.fields.get(field_name) {
            Some(rendered_type) => Some(rendered_type.as_str()),
            None => {
                let warning = render_unknown_field_name(&UnknownFieldName {
                    type_name,
                    field_name,
                    valid_names: &self.field_names(),
                    location: None,
                });
                warn!("{warning}");
                None
            }
        }
    }
}

/// Test-time contribution: the same client handle the runtime uses.
pub struct TesttimeContribution {
    pub db: Arc<ClientHandle>,
}

impl TesttimeContribution {
    pub fn new(client: Arc<ClientHandle>) -> Self {
        Self { db: client }
    }
}

/// Both contributions sharing one client handle, built once at startup.
pub struct BridgeContributions {
    pub runtime: RuntimeContribution,
    pub testtime: TesttimeContribution,
}

impl BridgeContributions {
    pub fn new(config: &BridgeConfig, root: &Path) -> Self {
        let client = Arc::new(ClientHandle::from_config(config, root));
        Self {
            runtime: RuntimeContribution::new(client.clone(), root),
            testtime: TesttimeContribution::new(client),
        }
    }
}

pub struct UnknownFieldName<'a> {
    pub type_name: &'a str,
    pub field_name: &'a str,
    pub valid_names: &'a [String],
    pub location: Option<&'a str>,
}

pub struct UnknownFieldType<'a> {
    pub type_name: &'a str,
    pub field_name: &'a str,
    pub unknown_type: &'a str,
    pub location: Option<&'a str>,
}

/// Warning text for an unknown context field name, with "did you mean"
/// suggestions computed over the valid names.
pub fn render_unknown_field_name(params: &UnknownFieldName<'_>) -> String {
    let mut out = format!(
        "{} Unknown field name \"{}\" on type \"{}\"",
        "Warning:".yellow(),
        params.field_name,
        params.type_name,
    );
    if let Some(location) = params.location {
        out.push_str(&format!("\n{} in {location}", "Warning:".yellow()));
    }

    let suggestions = suggestion_list(params.field_name, params.valid_names);
    if !suggestions.is_empty() {
        let rendered = suggestions
            .iter()
            .map(|s| format!("\"{}\"", s.green()))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "\n{} Did you mean {rendered} ?",
            "Warning:".yellow()
        ));
    }
    out
}

/// Warning text for an unknown field type. No suggestions here: the valid
/// set is owned by the generated client.
pub fn render_unknown_field_type(params: &UnknownFieldType<'_>) -> String {
    let mut out = format!(
        "{} Unknown type \"{}\" for field \"{}\" on type \"{}\"",
        "Warning:".yellow(),
        params.unknown_type,
        params.field_name,
        params.type_name,
    );
    if let Some(location) = params.location {
        out.push_str(&format!("\n{} in {location}", "Warning:".yellow()));
    }
    out
}
