pub mod loader;

pub use loader::{
    MUNICIPALITIES_FILE, MunicipalityRecord, PROPERTIES_FILE, PropertyRecord, SeedLoader,
    SeedLoaderError,
};
