//! Declarative mapping templates
//!
//! A `Template` describes the shape of an output record. Each output key is
//! bound to a `TemplateNode` that either copies a literal, dereferences a path
//! in the source record, calls a leaf function, nests another template, or
//! runs a `Selector` (fallback paths, defaults, per-item mapping and
//! post-processing).
//!
//! Keys whose node yields nothing are left out of the output, so applying a
//! template always produces an object but never one with placeholder values.
//!
//! Templates can also be loaded from JSON:
//!
//! ```json
//! {
//!   "entryTitle": "title.rendered",
//!   "sys": {
//!     "isPublished": true,
//!     "contentTypeId": { "$literal": "post" },
//!     "id": "id"
//!   },
//!   "tags": { "$path": "categories", "$mapping": { "label": "name" } },
//!   "caption": { "$path": ["caption", "alt_text"], "$default": "" }
//! }
//! ```

use crate::error::{MappingError, MappingResult};
use contensis_import_types::FieldPath;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Leaf function called with `(value, root)`
///
/// For `TemplateNode::Function` the value is the current scope; for a
/// selector's `$return` it is the resolved value (`Null` when nothing
/// resolved). Returning `None` leaves the key out.
pub type LeafFn = Arc<dyn Fn(&Value, &Value) -> Option<Value> + Send + Sync>;

/// Predicate called with `(value, root)`
pub type PredicateFn = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// How a single output key is produced
#[derive(Clone)]
pub enum TemplateNode {
    /// Copy a value verbatim
    Literal(Value),
    /// Dereference a path in the current scope
    Path(FieldPath),
    /// Compute the value from the current scope and root record
    Function(LeafFn),
    /// Nested object built from the same scope
    Object(Template),
    /// Path lookup with fallbacks and post-processing
    Select(Selector),
}

impl std::fmt::Debug for TemplateNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateNode::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            TemplateNode::Path(path) => f.debug_tuple("Path").field(path).finish(),
            TemplateNode::Function(_) => f.write_str("Function(..)"),
            TemplateNode::Object(template) => f.debug_tuple("Object").field(template).finish(),
            TemplateNode::Select(selector) => f.debug_tuple("Select").field(selector).finish(),
        }
    }
}

impl From<Template> for TemplateNode {
    fn from(template: Template) -> Self {
        TemplateNode::Object(template)
    }
}

impl From<Selector> for TemplateNode {
    fn from(selector: Selector) -> Self {
        TemplateNode::Select(selector)
    }
}

impl From<FieldPath> for TemplateNode {
    fn from(path: FieldPath) -> Self {
        TemplateNode::Path(path)
    }
}

impl TemplateNode {
    fn evaluate(&self, scope: &Value, root: &Value) -> Option<Value> {
        match self {
            TemplateNode::Literal(value) => Some(value.clone()),
            TemplateNode::Path(path) => path.resolve(scope).cloned(),
            TemplateNode::Function(f) => f(scope, root),
            TemplateNode::Object(template) => {
                Some(Value::Object(template.apply_scoped(scope, root)))
            }
            TemplateNode::Select(selector) => selector.evaluate(scope, root),
        }
    }
}

/// Path lookup with fallbacks
///
/// Evaluation order: resolve the first path yielding a non-null value (the
/// scope itself when no path is set), check `disable`, fall back to
/// `default`, apply `mapping` to each array item (or to an object value),
/// then hand the result to `returns`.
#[derive(Clone, Default)]
pub struct Selector {
    paths: Vec<FieldPath>,
    default: Option<Value>,
    mapping: Option<Box<Template>>,
    returns: Option<LeafFn>,
    disable: Option<PredicateFn>,
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("paths", &self.paths)
            .field("default", &self.default)
            .field("mapping", &self.mapping)
            .field("returns", &self.returns.as_ref().map(|_| ".."))
            .field("disable", &self.disable.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Selector {
    /// Selector reading a single path
    pub fn path(path: impl Into<FieldPath>) -> Self {
        Self {
            paths: vec![path.into()],
            ..Default::default()
        }
    }

    /// Selector trying each path in order
    pub fn first_of<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<FieldPath>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Selector over the current scope itself
    pub fn scope() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Apply `template` to every item of an array value (or to an object value)
    pub fn with_mapping(mut self, template: Template) -> Self {
        self.mapping = Some(Box::new(template));
        self
    }

    /// Post-process the resolved value
    pub fn with_return<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.returns = Some(Arc::new(f));
        self
    }

    /// Leave the key out when `f` returns true for the resolved value
    pub fn with_disable<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.disable = Some(Arc::new(f));
        self
    }

    fn evaluate(&self, scope: &Value, root: &Value) -> Option<Value> {
        let resolved = if self.paths.is_empty() {
            Some(scope)
        } else {
            self.paths
                .iter()
                .find_map(|path| path.resolve(scope).filter(|v| !v.is_null()))
        };

        if let Some(disable) = &self.disable {
            if disable(resolved.unwrap_or(&Value::Null), root) {
                return None;
            }
        }

        let value = resolved.cloned().or_else(|| self.default.clone());

        let mapped = match (value, &self.mapping) {
            (Some(Value::Array(items)), Some(template)) => Some(Value::Array(
                items
                    .iter()
                    .map(|item| Value::Object(template.apply_scoped(item, root)))
                    .collect(),
            )),
            (Some(item @ Value::Object(_)), Some(template)) => {
                Some(Value::Object(template.apply_scoped(&item, root)))
            }
            (value, _) => value,
        };

        match &self.returns {
            Some(f) => f(mapped.as_ref().unwrap_or(&Value::Null), root),
            None => mapped,
        }
    }
}

/// Declarative description of an output record
#[derive(Debug, Clone, Default)]
pub struct Template {
    fields: IndexMap<String, TemplateNode>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to any node
    pub fn field(mut self, key: impl Into<String>, node: impl Into<TemplateNode>) -> Self {
        self.fields.insert(key.into(), node.into());
        self
    }

    /// Bind `key` to a literal value
    pub fn literal(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field(key, TemplateNode::Literal(value.into()))
    }

    /// Bind `key` to the value at `path` in the source
    pub fn path(self, key: impl Into<String>, path: &str) -> Self {
        self.field(key, TemplateNode::Path(FieldPath::parse(path)))
    }

    /// Bind `key` to a function of `(scope, root)`
    pub fn function<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.field(key, TemplateNode::Function(Arc::new(f)))
    }

    /// Bind `key` to a nested object
    pub fn nested(self, key: impl Into<String>, template: Template) -> Self {
        self.field(key, TemplateNode::Object(template))
    }

    pub fn select(self, key: impl Into<String>, selector: Selector) -> Self {
        self.field(key, TemplateNode::Select(selector))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TemplateNode> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Project `source` into a new object shaped like this template
    pub fn apply(&self, source: &Value) -> Value {
        Value::Object(self.apply_scoped(source, source))
    }

    fn apply_scoped(&self, scope: &Value, root: &Value) -> Map<String, Value> {
        let mut output = Map::new();
        for (key, node) in &self.fields {
            if let Some(value) = node.evaluate(scope, root) {
                output.insert(key.clone(), value);
            }
        }
        output
    }

    /// Load a template from its JSON form
    pub fn from_json(value: &Value) -> MappingResult<Self> {
        Self::from_json_at(value, "")
    }

    /// Load a template whose errors are reported relative to `at`
    pub(crate) fn from_json_at(value: &Value, at: &str) -> MappingResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map, at),
            other => Err(MappingError::invalid_template(
                at,
                format!("expected an object, found {}", json_kind(other)),
            )),
        }
    }

    fn from_map(map: &Map<String, Value>, at: &str) -> MappingResult<Self> {
        let mut template = Template::new();
        for (key, value) in map {
            let path = if at.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", at, key)
            };
            template
                .fields
                .insert(key.clone(), node_from_json(value, &path)?);
        }
        Ok(template)
    }
}

fn node_from_json(value: &Value, at: &str) -> MappingResult<TemplateNode> {
    match value {
        Value::String(path) => Ok(TemplateNode::Path(FieldPath::parse(path))),
        Value::Object(map) if map.keys().any(|k| k.starts_with('$')) => {
            if map.keys().any(|k| !k.starts_with('$')) {
                return Err(MappingError::invalid_template(
                    at,
                    "cannot mix $-directives with output keys",
                ));
            }
            if let Some(literal) = map.get("$literal") {
                if map.len() > 1 {
                    return Err(MappingError::invalid_template(
                        at,
                        "$literal cannot be combined with other directives",
                    ));
                }
                return Ok(TemplateNode::Literal(literal.clone()));
            }
            selector_from_json(map, at).map(TemplateNode::Select)
        }
        Value::Object(map) => Template::from_map(map, at).map(TemplateNode::Object),
        other => Ok(TemplateNode::Literal(other.clone())),
    }
}

fn selector_from_json(map: &Map<String, Value>, at: &str) -> MappingResult<Selector> {
    let mut selector = Selector::scope();
    for (directive, value) in map {
        match directive.as_str() {
            "$path" => {
                selector.paths = match value {
                    Value::String(path) => vec![FieldPath::parse(path)],
                    Value::Array(paths) => paths
                        .iter()
                        .map(|p| {
                            p.as_str().map(FieldPath::parse).ok_or_else(|| {
                                MappingError::invalid_template(at, "$path entries must be strings")
                            })
                        })
                        .collect::<MappingResult<Vec<_>>>()?,
                    other => {
                        return Err(MappingError::invalid_template(
                            at,
                            format!(
                                "$path must be a string or list of strings, found {}",
                                json_kind(other)
                            ),
                        ))
                    }
                };
            }
            "$default" => selector.default = Some(value.clone()),
            "$mapping" => match value {
                Value::Object(inner) => {
                    selector.mapping = Some(Box::new(Template::from_map(inner, at)?));
                }
                other => {
                    return Err(MappingError::invalid_template(
                        at,
                        format!("$mapping must be an object, found {}", json_kind(other)),
                    ))
                }
            },
            "$return" | "$disable" | "$formatting" => {
                return Err(MappingError::invalid_template(
                    at,
                    format!("{} needs a function and can only be set in code", directive),
                ))
            }
            unknown => {
                return Err(MappingError::invalid_template(
                    at,
                    format!("unknown directive {}", unknown),
                ))
            }
        }
    }
    Ok(selector)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
