//! Error taxonomy for the bridge core

use std::path::PathBuf;
use thiserror::Error;

/// Pointer shown when no schema file can be found.
pub const SCHEMA_DOCS_URL: &str = "https://www.prisma.io/docs/concepts/components/prisma-schema";

#[derive(Debug, Error)]
pub enum BridgeError {
    /// No schema file anywhere under the project root. Fatal: none of the
    /// workflows can proceed without one.
    #[error(
        "no Prisma schema found under \"{}\". Create a `schema.prisma` or \
         `prisma/schema.prisma` file to get started: {SCHEMA_DOCS_URL}",
        root.display()
    )]
    SchemaNotFound { root: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
