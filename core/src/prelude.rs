//! Prelude module.
//!
//! Import it to bring the most common types and traits into scope.
pub use crate::dictionary::{DataDictionary as _, DataDictionaryEntry as _};
pub use crate::header::{HasLength as _, Header as _};
pub use crate::{DataElement, DataSet, Length, PrimitiveValue, Tag, Value, VR};
