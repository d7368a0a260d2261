//! Static alias tables for kubectl shorthand.
//!
//! Plain immutable lookups, resolved once per parse. The canonical form of
//! a resource is its lowercase plural (`po` -> `pods`); the canonical form
//! of a flag is its long name without dashes (`-n` -> `namespace`).

/// Resource shorthand and singular forms, mapped to the canonical plural.
const RESOURCE_ALIASES: &[(&str, &str)] = &[
    ("po", "pods"),
    ("pod", "pods"),
    ("pods", "pods"),
    ("deploy", "deployments"),
    ("deployment", "deployments"),
    ("deployments", "deployments"),
    ("svc", "services"),
    ("service", "services"),
    ("services", "services"),
    ("ns", "namespaces"),
    ("namespace", "namespaces"),
    ("namespaces", "namespaces"),
    ("cm", "configmaps"),
    ("configmap", "configmaps"),
    ("configmaps", "configmaps"),
    ("secret", "secrets"),
    ("secrets", "secrets"),
    ("no", "nodes"),
    ("node", "nodes"),
    ("nodes", "nodes"),
    ("rs", "replicasets"),
    ("replicaset", "replicasets"),
    ("replicasets", "replicasets"),
    ("sts", "statefulsets"),
    ("statefulset", "statefulsets"),
    ("statefulsets", "statefulsets"),
    ("ds", "daemonsets"),
    ("daemonset", "daemonsets"),
    ("daemonsets", "daemonsets"),
    ("ing", "ingresses"),
    ("ingress", "ingresses"),
    ("ingresses", "ingresses"),
    ("job", "jobs"),
    ("jobs", "jobs"),
    ("cj", "cronjobs"),
    ("cronjob", "cronjobs"),
    ("cronjobs", "cronjobs"),
    ("sa", "serviceaccounts"),
    ("serviceaccount", "serviceaccounts"),
    ("serviceaccounts", "serviceaccounts"),
    ("pv", "persistentvolumes"),
    ("persistentvolume", "persistentvolumes"),
    ("persistentvolumes", "persistentvolumes"),
    ("pvc", "persistentvolumeclaims"),
    ("persistentvolumeclaim", "persistentvolumeclaims"),
    ("persistentvolumeclaims", "persistentvolumeclaims"),
    ("ep", "endpoints"),
    ("endpoints", "endpoints"),
    ("ev", "events"),
    ("event", "events"),
    ("events", "events"),
];

/// Short flag -> canonical long flag.
const FLAG_ALIASES: &[(char, &str)] = &[
    ('n', "namespace"),
    ('o', "output"),
    ('f', "filename"),
    ('l', "selector"),
    ('A', "all-namespaces"),
    ('w', "watch"),
    ('c', "container"),
    ('i', "stdin"),
    ('t', "tty"),
    ('R', "recursive"),
    ('k', "kustomize"),
    ('L', "label-columns"),
];

/// Long flags that never consume a following word as their value.
/// `--dry-run` still accepts an `=`-form value (`--dry-run=client`).
const BOOLEAN_FLAGS: &[&str] = &[
    "all-namespaces",
    "watch",
    "force",
    "stdin",
    "tty",
    "recursive",
    "rm",
    "now",
    "wait",
    "overwrite",
    "record",
    "show-labels",
    "ignore-not-found",
    "dry-run",
];

/// Resolve a resource word to its canonical plural. Unknown resources pass
/// through lowercased so custom resources still compare by equality.
pub fn resolve_resource(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    RESOURCE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(lower)
}

/// Resolve a short flag character to its canonical long name.
pub fn resolve_short_flag(short: char) -> Option<&'static str> {
    FLAG_ALIASES
        .iter()
        .find(|(alias, _)| *alias == short)
        .map(|(_, long)| *long)
}

/// Does this canonical flag take no space-separated value?
pub fn is_boolean_flag(long: &str) -> bool {
    BOOLEAN_FLAGS.contains(&long)
}
