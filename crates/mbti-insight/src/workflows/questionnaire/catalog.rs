use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Question, Variant};

const BUILTIN_CATALOG: &str = include_str!("catalog.json");

/// Read-only question bank grouped by test length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionCatalog {
    variants: BTreeMap<Variant, Vec<Question>>,
}

impl QuestionCatalog {
    /// Catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Loads the replacement catalog when a path is configured, the built-in one otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let catalog = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::builtin()?,
        };

        let source = path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "builtin".to_string());
        info!(
            %source,
            variants = catalog.variants.len(),
            "question catalog loaded"
        );
        Ok(catalog)
    }

    pub fn questions(&self, variant: Variant) -> Option<&[Question]> {
        self.variants.get(&variant).map(Vec::as_slice)
    }

    pub fn variants(&self) -> impl Iterator<Item = (Variant, usize)> + '_ {
        self.variants
            .iter()
            .map(|(variant, questions)| (*variant, questions.len()))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.variants.is_empty() {
            return Err(CatalogError::Empty);
        }
        match self
            .variants
            .iter()
            .find(|(_, questions)| questions.is_empty())
        {
            Some((variant, _)) => Err(CatalogError::EmptyVariant(*variant)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read question catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid question catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question catalog defines no variants")]
    Empty,
    #[error("question catalog variant '{0}' has no questions")]
    EmptyVariant(Variant),
}
