pub mod config;
pub mod errors;
pub mod model_schema;
pub mod naming;


pub use config::{ModelCatalogConfig, ModelDefinition, RelationDefinition};
pub use errors::ModelCatalogError;
pub use model_schema::{
    BelongsToManyRelation, BelongsToRelation, GlobalScope, HasRelation, ModelCatalog,
    ModelSchema, RelationKind, RelationSchema, DELETED_AT_COLUMN, SOFT_DELETE_SCOPE,
};

const BENCHMARK_CATALOG: &str = include_str!("../../schema/benchmark.yaml");

impl ModelCatalog {
    /// The catalog the benchmark harness seeds and queries.
    pub fn benchmark() -> Result<Self, ModelCatalogError> {
        ModelCatalogConfig::from_yaml_str(BENCHMARK_CATALOG)?.to_model_catalog()
    }

    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ModelCatalogError> {
        ModelCatalogConfig::from_yaml_file(path)?.to_model_catalog()
    }
}
