mod municipality;
mod property;

pub use municipality::{Municipality, MunicipalityPatch};
pub use property::{Property, PropertyPatch};
