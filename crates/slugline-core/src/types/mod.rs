pub mod aggregate;
pub mod character;
pub mod ordered;
pub mod scene;
pub mod script;

pub use aggregate::{Aggregate, Appearance, CharacterIndexEntry, DocumentScenes, LocationDetail};
pub use character::{Character, CharacterMap};
pub use ordered::{Histogram, OrderedMap};
pub use scene::{IntExt, Scene, TimeOfDay};
pub use script::{CharacterSummary, Document, Script, ScriptSummary};
