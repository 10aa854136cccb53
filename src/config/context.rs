//! Shared state consulted while resolving elements

use super::loader::OverrideDocument;
use super::namespace::Namespace;
use crate::source::ExternalSourceChain;
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything an element can be resolved against: the override sources in
/// precedence order, plus the namespace of values published so far.
///
/// Owned by a single [`ConfigManager`](super::ConfigManager); elements only borrow it
/// for the duration of their resolution.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    environment_overrides: BTreeMap<String, Value>,
    local_config: OverrideDocument,
    instance_config: OverrideDocument,
    external_configs: Option<ExternalSourceChain>,
    namespace: Namespace,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment_overrides(mut self, overrides: BTreeMap<String, Value>) -> Self {
        self.environment_overrides = overrides;
        self
    }

    pub fn with_local_config(mut self, document: OverrideDocument) -> Self {
        self.local_config = document;
        self
    }

    pub fn with_instance_config(mut self, document: OverrideDocument) -> Self {
        self.instance_config = document;
        self
    }

    pub fn with_external_configs(mut self, chain: ExternalSourceChain) -> Self {
        self.external_configs = Some(chain);
        self
    }

    pub fn environment_overrides(&self) -> &BTreeMap<String, Value> {
        &self.environment_overrides
    }

    pub fn local_config(&self) -> &OverrideDocument {
        &self.local_config
    }

    pub fn instance_config(&self) -> &OverrideDocument {
        &self.instance_config
    }

    pub fn external_configs(&self) -> Option<&ExternalSourceChain> {
        self.external_configs.as_ref()
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub(crate) fn namespace_mut(&mut self) -> &mut Namespace {
        &mut self.namespace
    }

    pub(crate) fn set_local_config(&mut self, document: OverrideDocument) {
        self.local_config = document;
    }

    pub(crate) fn set_instance_config(&mut self, document: OverrideDocument) {
        self.instance_config = document;
    }

    pub(crate) fn set_external_configs(&mut self, chain: Option<ExternalSourceChain>) {
        self.external_configs = chain;
    }
}
