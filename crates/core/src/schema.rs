//! Versioned, data-driven Kubernetes schema tables.
//!
//! Three tables drive normalization, mirroring the apiserver's own
//! defaulting and conversion behavior closely enough for grading:
//!
//! - **defaulting rules**: fields the cluster would fill in when omitted,
//!   so an omitted default and an explicit default compare equal
//! - **type rules**: the expected scalar type per field, catching the
//!   quoting gotchas (`version: 1.10` parsing as the float `1.1`)
//! - **canonicalization rules**: which lists are semantically sets (sorted)
//!   and which server-populated fields are stripped before comparison
//!
//! The tables are append-only data, not code: adding an API version means
//! adding entries, never touching matcher logic. Entries are kind-scoped
//! where Kubernetes scopes them (`restartPolicy` defaults only for Pods)
//! and use `**.` patterns where the pod template embeds at varying depth.

use crate::path::{FieldPath, PathPattern};
use crate::value::Value;
use std::fmt;

/// Expected scalar type for a schema-typed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Boolean => write!(f, "boolean"),
        }
    }
}

impl FieldType {
    /// Does a submitted scalar satisfy this type?
    pub fn admits(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::String, Value::String(_))
                | (FieldType::Integer, Value::Int(_))
                | (FieldType::Boolean, Value::Bool(_))
        )
    }
}

/// Condition gating a defaulting rule, evaluated against the mapping that
/// would receive the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultCondition {
    Always,
    /// The sibling `image` field has the tag `latest` (or no tag).
    ImageTagLatest,
    /// The sibling `image` field has an explicit, non-`latest` tag.
    ImageTagPinned,
}

impl DefaultCondition {
    pub fn holds(&self, sibling_fields: &std::collections::BTreeMap<String, Value>) -> bool {
        match self {
            DefaultCondition::Always => true,
            DefaultCondition::ImageTagLatest => {
                sibling_fields.get("image").and_then(Value::as_str).is_some_and(image_tag_is_latest)
            }
            DefaultCondition::ImageTagPinned => sibling_fields
                .get("image")
                .and_then(Value::as_str)
                .is_some_and(|image| !image_tag_is_latest(image)),
        }
    }
}

/// `nginx` and `nginx:latest` are both "latest"; `reg:5000/app:1.25` is not.
fn image_tag_is_latest(image: &str) -> bool {
    let last_component = image.rsplit('/').next().unwrap_or(image);
    match last_component.rsplit_once(':') {
        Some((_, tag)) => tag == "latest",
        None => true,
    }
}

/// One defaulting rule: when `pattern` names an absent field in a manifest
/// of a matching kind and `condition` holds, insert `value`.
#[derive(Debug, Clone)]
pub struct DefaultRule {
    /// Kinds the rule applies to; empty means any kind.
    pub kinds: &'static [&'static str],
    pub pattern: PathPattern,
    pub condition: DefaultCondition,
    pub value: Value,
}

/// One type rule: fields matching `pattern` must hold a scalar of `ty`.
#[derive(Debug, Clone)]
pub struct TypeRule {
    /// Kinds the rule applies to; empty means any kind.
    pub kinds: &'static [&'static str],
    pub pattern: PathPattern,
    pub ty: FieldType,
}

/// The full schema table for one table version.
#[derive(Debug, Clone)]
pub struct SchemaTable {
    pub version: &'static str,
    defaults: Vec<DefaultRule>,
    types: Vec<TypeRule>,
    /// Lists with set semantics -- canonicalized by sorting.
    set_lists: Vec<PathPattern>,
    /// Server-populated fields stripped before comparison.
    stripped: Vec<PathPattern>,
}

impl SchemaTable {
    /// The built-in table covering the core/v1 and apps/v1 surface the
    /// lessons exercise. Pattern literals are compiled-in constants, so a
    /// parse failure here is a build defect, not a runtime condition.
    pub fn builtin() -> Self {
        let pat = |text: &str| {
            PathPattern::parse(text).unwrap_or_else(|e| panic!("built-in schema pattern: {}", e))
        };
        const WORKLOADS: &[&str] = &["Deployment", "StatefulSet", "DaemonSet", "ReplicaSet", "Job"];
        const REPLICATED: &[&str] = &["Deployment", "StatefulSet", "ReplicaSet"];

        // Defaults are filled into existing parent mappings only, so every
        // rule names a field whose parent is present whenever the field is
        // relevant (a container always exists around imagePullPolicy).
        let defaults = vec![
            DefaultRule {
                kinds: &["Pod"],
                pattern: pat("spec.restartPolicy"),
                condition: DefaultCondition::Always,
                value: Value::String("Always".to_string()),
            },
            DefaultRule {
                kinds: WORKLOADS,
                pattern: pat("spec.template.spec.restartPolicy"),
                condition: DefaultCondition::Always,
                value: Value::String("Always".to_string()),
            },
            DefaultRule {
                kinds: &[],
                pattern: pat("**.containers[*].imagePullPolicy"),
                condition: DefaultCondition::ImageTagPinned,
                value: Value::String("IfNotPresent".to_string()),
            },
            DefaultRule {
                kinds: &[],
                pattern: pat("**.containers[*].imagePullPolicy"),
                condition: DefaultCondition::ImageTagLatest,
                value: Value::String("Always".to_string()),
            },
            DefaultRule {
                kinds: &[],
                pattern: pat("**.containers[*].ports[*].protocol"),
                condition: DefaultCondition::Always,
                value: Value::String("TCP".to_string()),
            },
            DefaultRule {
                kinds: &["Service"],
                pattern: pat("spec.ports[*].protocol"),
                condition: DefaultCondition::Always,
                value: Value::String("TCP".to_string()),
            },
            DefaultRule {
                kinds: &["Service"],
                pattern: pat("spec.type"),
                condition: DefaultCondition::Always,
                value: Value::String("ClusterIP".to_string()),
            },
            DefaultRule {
                kinds: &["Service"],
                pattern: pat("spec.sessionAffinity"),
                condition: DefaultCondition::Always,
                value: Value::String("None".to_string()),
            },
            DefaultRule {
                kinds: &["Pod"],
                pattern: pat("spec.dnsPolicy"),
                condition: DefaultCondition::Always,
                value: Value::String("ClusterFirst".to_string()),
            },
            DefaultRule {
                kinds: WORKLOADS,
                pattern: pat("spec.template.spec.dnsPolicy"),
                condition: DefaultCondition::Always,
                value: Value::String("ClusterFirst".to_string()),
            },
            DefaultRule {
                kinds: &["Pod"],
                pattern: pat("spec.terminationGracePeriodSeconds"),
                condition: DefaultCondition::Always,
                value: Value::Int(30),
            },
        ];

        let types = vec![
            TypeRule { kinds: &[], pattern: pat("apiVersion"), ty: FieldType::String },
            TypeRule { kinds: &[], pattern: pat("kind"), ty: FieldType::String },
            TypeRule { kinds: &[], pattern: pat("metadata.name"), ty: FieldType::String },
            TypeRule { kinds: &[], pattern: pat("metadata.namespace"), ty: FieldType::String },
            TypeRule { kinds: &[], pattern: pat("metadata.labels.*"), ty: FieldType::String },
            TypeRule { kinds: &[], pattern: pat("metadata.annotations.*"), ty: FieldType::String },
            TypeRule { kinds: &[], pattern: pat("**.matchLabels.*"), ty: FieldType::String },
            TypeRule { kinds: &[], pattern: pat("**.template.metadata.labels.*"), ty: FieldType::String },
            TypeRule { kinds: REPLICATED, pattern: pat("spec.replicas"), ty: FieldType::Integer },
            TypeRule { kinds: &[], pattern: pat("**.containers[*].name"), ty: FieldType::String },
            TypeRule { kinds: &[], pattern: pat("**.containers[*].image"), ty: FieldType::String },
            TypeRule {
                kinds: &[],
                pattern: pat("**.containers[*].ports[*].containerPort"),
                ty: FieldType::Integer,
            },
            TypeRule { kinds: &[], pattern: pat("**.env[*].name"), ty: FieldType::String },
            // The classic lesson gotcha: env values must be strings, so
            // `value: 1.10` (a YAML float) is a type error, not a value.
            TypeRule { kinds: &[], pattern: pat("**.env[*].value"), ty: FieldType::String },
            TypeRule { kinds: &["Service"], pattern: pat("spec.ports[*].port"), ty: FieldType::Integer },
            TypeRule {
                kinds: &["Service"],
                pattern: pat("spec.ports[*].nodePort"),
                ty: FieldType::Integer,
            },
            TypeRule { kinds: &["ConfigMap"], pattern: pat("data.*"), ty: FieldType::String },
            TypeRule { kinds: &["Secret"], pattern: pat("stringData.*"), ty: FieldType::String },
        ];

        let set_lists = vec![
            pat("rules[*].verbs"),
            pat("rules[*].resources"),
            pat("rules[*].apiGroups"),
            pat("rules[*].resourceNames"),
        ];

        let stripped = vec![
            pat("metadata.uid"),
            pat("metadata.resourceVersion"),
            pat("metadata.creationTimestamp"),
            pat("metadata.generation"),
            pat("metadata.selfLink"),
            pat("metadata.managedFields"),
            pat("metadata.annotations.\"kubectl.kubernetes.io/last-applied-configuration\""),
            pat("status"),
        ];

        SchemaTable {
            version: crate::SCHEMA_TABLE_VERSION,
            defaults,
            types,
            set_lists,
            stripped,
        }
    }

    /// Defaulting rules applicable to a manifest of `kind`.
    pub fn defaults_for<'a>(&'a self, kind: Option<&'a str>) -> impl Iterator<Item = &'a DefaultRule> {
        self.defaults.iter().filter(move |rule| kind_applies(rule.kinds, kind))
    }

    /// Expected type at `path` for a manifest of `kind`, if any rule matches.
    pub fn expected_type(&self, kind: Option<&str>, path: &FieldPath) -> Option<FieldType> {
        self.types
            .iter()
            .filter(|rule| kind_applies(rule.kinds, kind) && rule.pattern.matches(path))
            .max_by_key(|rule| rule.pattern.specificity())
            .map(|rule| rule.ty)
    }

    /// Is the list at `path` a set (order-insensitive)?
    pub fn is_set_list(&self, path: &FieldPath) -> bool {
        self.set_lists.iter().any(|pattern| pattern.matches(path))
    }

    /// Is `path` a server-populated field to strip before comparison?
    pub fn is_stripped(&self, path: &FieldPath) -> bool {
        self.stripped.iter().any(|pattern| pattern.matches(path))
    }
}

fn kind_applies(rule_kinds: &[&str], kind: Option<&str>) -> bool {
    rule_kinds.is_empty() || kind.is_some_and(|k| rule_kinds.contains(&k))
}
