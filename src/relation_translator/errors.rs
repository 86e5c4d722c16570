use thiserror::Error;

use crate::model_catalog::ModelCatalogError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslateError {
    #[error("Relation `{relation}` on model `{model}` is a `{kind}` relation, which cannot be translated")]
    UnsupportedRelationKind {
        model: String,
        relation: String,
        kind: String,
    },
    #[error("Model `{model}` has no relation named `{relation}`")]
    UnknownRelation { model: String, relation: String },
    #[error("Unknown model `{model}`")]
    UnknownModel { model: String },
    #[error(transparent)]
    Catalog(ModelCatalogError),
}

impl From<ModelCatalogError> for TranslateError {
    fn from(err: ModelCatalogError) -> Self {
        match err {
            ModelCatalogError::Model { model } => TranslateError::UnknownModel { model },
            other => TranslateError::Catalog(other),
        }
    }
}
