//! Record mapping for Contensis imports
//!
//! Turns source records into import-ready records by dispatching each one to
//! a per-content-type mapper.
//!
//! - **Dispatcher**: `map_entries` picks a `MapperEntry` from a `Mappers`
//!   table using a discriminator field (default `sys.contentTypeId`)
//! - **Templates**: declarative projections of a source record into a new shape
//! - **Utilities**: helpers commonly used inside mappers

pub mod dispatcher;
pub mod error;
pub mod template;
pub mod util;

pub use dispatcher::{
    choose_mapper_by_field_value, map_entries, map_entries_by_field, MapContext, MapperEntry,
    Mappers, MappingFn, DEFAULT_MAPPER,
};
pub use error::{MappingError, MappingResult};
pub use template::{LeafFn, PredicateFn, Selector, Template, TemplateNode};
pub use util::{
    add_minutes, dedupe, deterministic_guid, generate_new_asset, get_entries_by_content_types,
    replace_content_type_id,
};
