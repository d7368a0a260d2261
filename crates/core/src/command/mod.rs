//! Command interpreter: `kubectl`-style command lines to [`CommandIntent`].
//!
//! Static intent extraction only -- nothing is ever executed. The
//! interpreter resolves resource shorthand and flag aliases through the
//! tables in [`alias`], so `kubectl delete po web -n dev` and
//! `kubectl delete pods web --namespace=dev` produce identical intents.

pub mod alias;
pub mod lexer;

use crate::budget::Budget;
use crate::error::{Interrupt, ParseError};
use serde::Serialize;
use std::collections::BTreeMap;

/// A canonical flag value. Bare boolean flags and `--flag=true` collapse
/// to the same representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
}

impl FlagValue {
    /// Rendering used in discrepancy messages.
    pub fn render(&self) -> String {
        match self {
            FlagValue::Bool(b) => b.to_string(),
            FlagValue::Str(s) => s.clone(),
        }
    }
}

/// Canonical structured form of one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandIntent {
    /// The kubectl verb; subcommand verbs join with a space
    /// (`rollout restart`).
    pub verb: String,
    /// Canonical plural resource kind, when the verb addresses one.
    pub resource_kind: Option<String>,
    /// Target object name, when given.
    pub name: Option<String>,
    /// Canonical flag key -> value.
    pub flags: BTreeMap<String, FlagValue>,
    /// Remaining positional arguments, including everything after `--`.
    pub positional_args: Vec<String>,
}

/// Verbs that address a resource kind (`kubectl get pods web`).
const RESOURCE_VERBS: &[&str] = &[
    "get", "describe", "delete", "edit", "create", "scale", "autoscale", "label", "annotate",
    "patch", "expose", "top", "rollout", "set",
];

/// Verbs whose first positional is an object name, not a kind.
const NAME_VERBS: &[&str] = &["run", "logs", "exec", "port-forward", "attach", "cp"];

/// Verbs taking a subcommand word (`rollout restart`, `set image`).
const SUBCOMMAND_VERBS: &[&str] = &["rollout", "set", "config"];

/// Parse a raw command line into a [`CommandIntent`].
pub fn parse_command(raw: &str) -> Result<CommandIntent, ParseError> {
    match parse_command_within(&Budget::unlimited(), raw) {
        Ok(intent) => Ok(intent),
        Err(Interrupt::Parse(e)) => Err(e),
        // Unreachable with an unlimited budget; kept total rather than panicking.
        Err(Interrupt::Deadline(_)) => Err(ParseError::syntax("parsing interrupted")),
    }
}

/// Budget-aware variant used by the runner.
pub fn parse_command_within(budget: &Budget, raw: &str) -> Result<CommandIntent, Interrupt> {
    budget.check()?;
    let words = lexer::lex(raw)?;
    let mut texts = words.into_iter().map(|w| w.text);

    let program = texts
        .next()
        .ok_or_else(|| ParseError::syntax("the submission is empty"))?;
    if program != "kubectl" && program != "k" {
        return Err(ParseError::unsupported(
            program.clone(),
            "only kubectl commands are graded",
        )
        .into());
    }

    let mut flags: BTreeMap<String, FlagValue> = BTreeMap::new();
    let mut positionals: Vec<String> = Vec::new();
    let mut trailing_args: Vec<String> = Vec::new();
    let mut after_separator = false;

    let rest: Vec<String> = texts.collect();
    let mut i = 0;
    while i < rest.len() {
        budget.check()?;
        let word = &rest[i];
        if after_separator {
            trailing_args.push(word.clone());
            i += 1;
            continue;
        }
        if word == "--" {
            after_separator = true;
            i += 1;
            continue;
        }
        if let Some(long) = word.strip_prefix("--") {
            parse_long_flag(long, &rest, &mut i, &mut flags);
            continue;
        }
        if word.len() >= 2 && word.starts_with('-') && !word.starts_with("--") {
            parse_short_flag(&word[1..], &rest, &mut i, &mut flags)?;
            continue;
        }
        positionals.push(word.clone());
        i += 1;
    }

    let mut positionals = positionals.into_iter();
    let mut verb = positionals
        .next()
        .ok_or_else(|| ParseError::syntax("missing a kubectl verb"))?
        .to_ascii_lowercase();
    let mut remaining: Vec<String> = positionals.collect();

    if SUBCOMMAND_VERBS.contains(&verb.as_str()) && !remaining.is_empty() {
        verb = format!("{} {}", verb, remaining.remove(0).to_ascii_lowercase());
    }

    let base_verb = verb.split(' ').next().unwrap_or(&verb).to_string();
    let mut resource_kind = None;
    let mut name = None;
    let mut positional_args = Vec::new();

    let mut remaining = remaining.into_iter().peekable();
    if RESOURCE_VERBS.contains(&base_verb.as_str()) {
        if let Some(first) = remaining.next() {
            match first.split_once('/') {
                Some((kind, object)) => {
                    resource_kind = Some(alias::resolve_resource(kind));
                    name = Some(object.to_string());
                }
                None => {
                    resource_kind = Some(alias::resolve_resource(&first));
                    if let Some(next) = remaining.peek() {
                        if !next.contains('=') {
                            name = remaining.next();
                        }
                    }
                }
            }
        }
    } else if NAME_VERBS.contains(&base_verb.as_str()) {
        if let Some(first) = remaining.next() {
            match first.split_once('/') {
                Some((kind, object)) => {
                    resource_kind = Some(alias::resolve_resource(kind));
                    name = Some(object.to_string());
                }
                None => name = Some(first),
            }
        }
    }
    positional_args.extend(remaining);
    positional_args.extend(trailing_args);

    Ok(CommandIntent {
        verb,
        resource_kind,
        name,
        flags,
        positional_args,
    })
}

/// `--flag`, `--flag=value`, `--flag value`.
fn parse_long_flag(
    long: &str,
    rest: &[String],
    i: &mut usize,
    flags: &mut BTreeMap<String, FlagValue>,
) {
    match long.split_once('=') {
        Some((key, value)) => {
            flags.insert(key.to_string(), canonical_value(key, value));
            *i += 1;
        }
        None => {
            if alias::is_boolean_flag(long) {
                flags.insert(long.to_string(), FlagValue::Bool(true));
                *i += 1;
            } else if let Some(next) = rest.get(*i + 1).filter(|w| !w.starts_with('-')) {
                flags.insert(long.to_string(), canonical_value(long, next));
                *i += 2;
            } else {
                flags.insert(long.to_string(), FlagValue::Bool(true));
                *i += 1;
            }
        }
    }
}

/// `-n dev`, `-n=dev`, `-oyaml`, `-it`.
fn parse_short_flag(
    body: &str,
    rest: &[String],
    i: &mut usize,
    flags: &mut BTreeMap<String, FlagValue>,
) -> Result<(), ParseError> {
    let chars: Vec<char> = body.chars().collect();

    // Combined boolean shorts: every char must alias to a boolean flag.
    if chars.len() > 1 && !body.contains('=') {
        let longs: Vec<&str> = chars
            .iter()
            .filter_map(|&c| alias::resolve_short_flag(c))
            .filter(|long| alias::is_boolean_flag(long))
            .collect();
        if longs.len() == chars.len() {
            for long in longs {
                flags.insert(long.to_string(), FlagValue::Bool(true));
            }
            *i += 1;
            return Ok(());
        }
    }

    let first = chars[0];
    let key = alias::resolve_short_flag(first)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());

    let attached = &body[first.len_utf8()..];
    if let Some(value) = attached.strip_prefix('=') {
        flags.insert(key.clone(), canonical_value(&key, value));
        *i += 1;
    } else if !attached.is_empty() && alias::resolve_short_flag(first).is_some() {
        // Attached value form, e.g. `-oyaml`.
        flags.insert(key.clone(), canonical_value(&key, attached));
        *i += 1;
    } else if alias::is_boolean_flag(&key) {
        flags.insert(key, FlagValue::Bool(true));
        *i += 1;
    } else if let Some(next) = rest.get(*i + 1).filter(|w| !w.starts_with('-')) {
        flags.insert(key.clone(), canonical_value(&key, next));
        *i += 2;
    } else {
        flags.insert(key, FlagValue::Bool(true));
        *i += 1;
    }
    Ok(())
}

/// Boolean-flag values written explicitly (`--force=true`) collapse to the
/// same representation as the bare form.
fn canonical_value(key: &str, value: &str) -> FlagValue {
    if alias::is_boolean_flag(key) {
        match value {
            "true" => return FlagValue::Bool(true),
            "false" => return FlagValue::Bool(false),
            _ => {}
        }
    }
    FlagValue::Str(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_get() {
        let intent = parse_command("kubectl get pods").unwrap();
        assert_eq!(intent.verb, "get");
        assert_eq!(intent.resource_kind.as_deref(), Some("pods"));
        assert_eq!(intent.name, None);
    }

    #[test]
    fn shorthand_and_flag_alias_normalize() {
        let a = parse_command("kubectl delete po web -n dev").unwrap();
        let b = parse_command("kubectl delete pods web --namespace=dev").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.flags.get("namespace"), Some(&FlagValue::Str("dev".to_string())));
    }

    #[test]
    fn equals_and_space_forms_are_equivalent() {
        let a = parse_command("kubectl scale deployment web --replicas=3").unwrap();
        let b = parse_command("kubectl scale deployment web --replicas 3").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.flags.get("replicas"), Some(&FlagValue::Str("3".to_string())));
    }

    #[test]
    fn bare_boolean_flag_defaults_true() {
        let intent = parse_command("kubectl delete pod web --force").unwrap();
        assert_eq!(intent.flags.get("force"), Some(&FlagValue::Bool(true)));
        let explicit = parse_command("kubectl delete pod web --force=true").unwrap();
        assert_eq!(intent.flags, explicit.flags);
    }

    #[test]
    fn slash_form_resolves_kind_and_name() {
        let intent = parse_command("kubectl delete deploy/web").unwrap();
        assert_eq!(intent.resource_kind.as_deref(), Some("deployments"));
        assert_eq!(intent.name.as_deref(), Some("web"));
    }

    #[test]
    fn rollout_subcommand_joins_verb() {
        let intent = parse_command("kubectl rollout restart deploy/web").unwrap();
        assert_eq!(intent.verb, "rollout restart");
        assert_eq!(intent.resource_kind.as_deref(), Some("deployments"));
        assert_eq!(intent.name.as_deref(), Some("web"));
    }

    #[test]
    fn run_takes_a_name_not_a_kind() {
        let intent = parse_command("kubectl run web --image=nginx:1.25").unwrap();
        assert_eq!(intent.verb, "run");
        assert_eq!(intent.resource_kind, None);
        assert_eq!(intent.name.as_deref(), Some("web"));
        assert_eq!(intent.flags.get("image"), Some(&FlagValue::Str("nginx:1.25".to_string())));
    }

    #[test]
    fn combined_short_booleans_split() {
        let intent = parse_command("kubectl exec web -it -- sh").unwrap();
        assert_eq!(intent.flags.get("stdin"), Some(&FlagValue::Bool(true)));
        assert_eq!(intent.flags.get("tty"), Some(&FlagValue::Bool(true)));
        assert_eq!(intent.positional_args, ["sh"]);
    }

    #[test]
    fn attached_short_value() {
        let intent = parse_command("kubectl get pods -oyaml").unwrap();
        assert_eq!(intent.flags.get("output"), Some(&FlagValue::Str("yaml".to_string())));
    }

    #[test]
    fn label_pairs_stay_positional() {
        let intent = parse_command("kubectl label pod web tier=frontend").unwrap();
        assert_eq!(intent.resource_kind.as_deref(), Some("pods"));
        assert_eq!(intent.name.as_deref(), Some("web"));
        assert_eq!(intent.positional_args, ["tier=frontend"]);
    }

    #[test]
    fn non_kubectl_program_is_unsupported() {
        let err = parse_command("docker run nginx").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedSyntax { .. }));
    }

    #[test]
    fn flags_before_the_verb_are_accepted() {
        let intent = parse_command("kubectl -n dev get pods").unwrap();
        assert_eq!(intent.verb, "get");
        assert_eq!(intent.flags.get("namespace"), Some(&FlagValue::Str("dev".to_string())));
    }
}
