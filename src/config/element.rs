//! Configuration elements: constants and options

use super::context::ResolutionContext;
use super::namespace::Scope;
use super::parsers::Parser;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Hardcoded,
    EnvironmentOverride,
    LocalOverride,
    InstanceConfig,
    ExternalConfig,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hardcoded => "hardcoded",
            Self::EnvironmentOverride => "environment_override",
            Self::LocalOverride => "local_override",
            Self::InstanceConfig => "instance_config",
            Self::ExternalConfig => "external_config",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes a default from values published before the element.
pub type Initializer = Arc<dyn Fn(&Scope<'_>) -> Result<Value>>;

/// Compiled-in default of an element.
#[derive(Clone)]
pub enum DefaultExpr {
    /// No default; the value must come from an override.
    Unset,
    Value(Value),
    Computed {
        /// Human-readable form, shown in documentation.
        expr: String,
        /// Names the initializer reads; all must already be published.
        requires: Vec<String>,
        init: Initializer,
    },
}

impl DefaultExpr {
    pub fn text(&self) -> String {
        match self {
            Self::Unset => String::new(),
            Self::Value(value) => value.to_string(),
            Self::Computed { expr, .. } => expr.clone(),
        }
    }

    pub fn requires(&self) -> &[String] {
        match self {
            Self::Computed { requires, .. } => requires,
            _ => &[],
        }
    }

    fn evaluate(&self, name: &str, ctx: &ResolutionContext) -> Result<Value> {
        match self {
            Self::Unset => Err(ConfigError::RequiredOptionUnset { name: name.to_string() }),
            Self::Value(value) => Ok(value.clone()),
            Self::Computed { requires, init, .. } => {
                let namespace = ctx.namespace();
                if let Some(missing) = requires.iter().find(|r| !namespace.contains(r)) {
                    return Err(ConfigError::UnresolvedName {
                        name: missing.clone(),
                        referenced_by: name.to_string(),
                    });
                }
                init(&Scope::new(namespace, name))
            }
        }
    }
}

impl fmt::Debug for DefaultExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Unset"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Computed { expr, requires, .. } => f
                .debug_struct("Computed")
                .field("expr", expr)
                .field("requires", requires)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Always evaluates its default; cannot be overridden.
    Constant,
    /// Consults the override sources before falling back to its default.
    Option,
}

/// A resolved element value together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub source: ValueSource,
}

/// A named, documented configuration value.
#[derive(Clone)]
pub struct ConfigElement {
    name: String,
    doc: String,
    default: DefaultExpr,
    parser: Option<Parser>,
    masked: bool,
    kind: ElementKind,
}

impl ConfigElement {
    pub fn constant(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name.into(), doc.into(), ElementKind::Constant)
    }

    pub fn option(name: impl Into<String>, doc: impl Into<String>) -> Self {
        Self::new(name.into(), doc.into(), ElementKind::Option)
    }

    fn new(name: String, doc: String, kind: ElementKind) -> Self {
        Self { name, doc, default: DefaultExpr::Unset, parser: None, masked: false, kind }
    }

    /// Literal default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultExpr::Value(value.into());
        self
    }

    /// Default computed from earlier-published values named in `requires`.
    pub fn default_with<F>(mut self, expr: impl Into<String>, requires: &[&str], init: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<Value> + 'static,
    {
        self.default = DefaultExpr::Computed {
            expr: expr.into(),
            requires: requires.iter().map(|r| r.to_string()).collect(),
            init: Arc::new(init),
        };
        self
    }

    pub fn parser(mut self, parser: Parser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Redact the value (when it is a string) in every rendered view.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn default_expr(&self) -> &DefaultExpr {
        &self.default
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Resolve the element against `ctx`.
    ///
    /// Constants evaluate their default. Options walk the precedence chain
    /// (environment, local override, instance config, external sources, default)
    /// and then apply their parser.
    pub fn resolve(&self, ctx: &ResolutionContext) -> Result<Resolved> {
        match self.kind {
            ElementKind::Constant => Ok(Resolved {
                value: self.default.evaluate(&self.name, ctx)?,
                source: ValueSource::Hardcoded,
            }),
            ElementKind::Option => {
                let (raw, source) = self.raw_value(ctx)?;
                Ok(Resolved { value: self.apply_parser(raw)?, source })
            }
        }
    }

    /// Unparsed option value and where it was found.
    pub fn raw_value(&self, ctx: &ResolutionContext) -> Result<(Value, ValueSource)> {
        let name = self.name.as_str();

        if let Some(value) = ctx.environment_overrides().get(name) {
            return Ok((value.clone(), ValueSource::EnvironmentOverride));
        }
        if let Some(value) = ctx.local_config().get(name) {
            return Ok((value.clone(), ValueSource::LocalOverride));
        }
        if let Some(value) = ctx.instance_config().get(name) {
            return Ok((value.clone(), ValueSource::InstanceConfig));
        }
        if let Some(chain) = ctx.external_configs() {
            match chain.get(name) {
                Ok(value) => return Ok((value, ValueSource::ExternalConfig)),
                Err(ConfigError::KeyNotFoundAnywhere { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        Ok((self.default.evaluate(name, ctx)?, ValueSource::Default))
    }

    fn apply_parser(&self, raw: Value) -> Result<Value> {
        match self.parser {
            Some(parse) => {
                parse(&raw).map_err(|reason| ConfigError::Parse { name: self.name.clone(), reason })
            }
            None => Ok(raw),
        }
    }
}

impl fmt::Debug for ConfigElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigElement")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("masked", &self.masked)
            .field("parsed", &self.parser.is_some())
            .finish()
    }
}
