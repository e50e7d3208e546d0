pub mod loader;
pub mod types;

pub use loader::{load_catalog, load_scenario_file, Catalog, CatalogError, ScenarioFile};
pub use types::{Choice, Scenario};
