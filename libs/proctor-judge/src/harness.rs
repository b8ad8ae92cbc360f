/// Test Harness - JavaScript side of the sandbox protocol
///
/// **Protocol:**
/// 1. `BOOTSTRAP` runs before any candidate code. It captures pristine
///    `JSON.stringify`/`String` plus the report op in a closure, installs the
///    frozen `__proctorRun` global, then strips host and code-generation
///    globals (`Deno`, `__bootstrap`, `eval`, `Function` and its siblings).
/// 2. Candidate code is evaluated.
/// 3. `invocation()` builds the script that resolves the entry function and
///    calls `__proctorRun(entry, inputs)`.
/// 4. The harness reports one `(kind, payload)` pair per case (or a single
///    `missing` pair) through `op_proctor_report`; comparison happens in Rust.
///    Records are never built as JS objects, so prototype hooks such as
///    `toJSON` cannot rewrite a case's kind.
use crate::error::SandboxError;
use proctor_common::types::TestCase;
use proctor_common::value::Value;

pub const BOOTSTRAP: &str = r#"
((ops) => {
    const report = ops.op_proctor_report;
    const stringify = JSON.stringify;
    const toText = String;

    const describe = (e) => {
        try {
            if (e !== null && (typeof e === "object" || typeof e === "function") && "message" in e) {
                return toText(e.message);
            }
            return toText(e);
        } catch (_) {
            return "Unknown error";
        }
    };

    const run = (entry, inputs) => {
        if (typeof entry !== "function") {
            report("missing", "");
            return;
        }
        for (let i = 0; i < inputs.length; i++) {
            let kind;
            let payload = "";
            try {
                const rendered = stringify(entry(...inputs[i]));
                if (rendered === undefined) {
                    kind = "undefined";
                } else {
                    kind = "returned";
                    payload = rendered;
                }
            } catch (e) {
                kind = "threw";
                payload = describe(e);
            }
            report(kind, payload);
        }
    };

    Object.defineProperty(globalThis, "__proctorRun", {
        value: Object.freeze(run),
        writable: false,
        configurable: false,
        enumerable: false,
    });

    const AsyncFunction = (async function () {}).constructor;
    const GeneratorFunction = (function* () {}).constructor;
    const AsyncGeneratorFunction = (async function* () {}).constructor;
    for (const ctor of [Function, AsyncFunction, GeneratorFunction, AsyncGeneratorFunction]) {
        Object.defineProperty(ctor.prototype, "constructor", {
            value: undefined,
            configurable: false,
            writable: false,
        });
    }

    delete globalThis.Deno;
    delete globalThis.__bootstrap;
    delete globalThis.eval;
    delete globalThis.Function;
})(Deno.core.ops);
"#;

const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `name` can be referenced as a plain JavaScript identifier.
/// Only ASCII identifiers are accepted; the name is spliced into script text.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = match chars.next() {
        Some(c) => c.is_ascii_alphabetic() || c == '_' || c == '$',
        None => false,
    };
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&name)
}

/// Build the test-stage script.
///
/// `typeof` keeps an undeclared name from throwing, and also finds top-level
/// `let`/`const` bindings that never become `globalThis` properties.
pub fn invocation(entry: &str, test_cases: &[TestCase]) -> Result<String, SandboxError> {
    if !is_valid_identifier(entry) {
        return Err(SandboxError::EntryNotFound {
            name: entry.to_string(),
        });
    }
    let inputs: Vec<&Vec<Value>> = test_cases.iter().map(|tc| &tc.input).collect();
    let inputs_json = serde_json::to_string(&inputs)
        .map_err(|e| SandboxError::Protocol(format!("cannot encode test inputs: {}", e)))?;

    Ok(format!(
        "__proctorRun(typeof {entry} === \"function\" ? {entry} : undefined, {inputs_json});"
    ))
}

/// Raw, unjudged result of invoking the entry function for one test case
#[derive(Debug, Clone, PartialEq)]
pub enum CaseRun {
    Returned(Value),
    /// Return value has no JSON form (`undefined`, a function, ...)
    Undefined,
    Threw(String),
}

/// Records reported from inside the isolate, kept in the runtime's OpState.
/// Pushes beyond `limit` are dropped and flagged.
#[derive(Debug, Default)]
pub struct HarnessRecords {
    items: Vec<(String, String)>,
    limit: usize,
    overflowed: bool,
}

impl HarnessRecords {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit,
            overflowed: false,
        }
    }

    pub fn push(&mut self, kind: &str, payload: &str) {
        if self.items.len() < self.limit {
            self.items.push((kind.to_string(), payload.to_string()));
        } else {
            self.overflowed = true;
        }
    }
}

/// Decode the records of the test stage into one `CaseRun` per test case
pub fn decode_records(
    records: HarnessRecords,
    entry: &str,
    expected_cases: usize,
) -> Result<Vec<CaseRun>, SandboxError> {
    if records.overflowed {
        return Err(SandboxError::Protocol("too many harness records".to_string()));
    }

    let mut runs = Vec::with_capacity(expected_cases);
    for (kind, payload) in records.items {
        let run = match kind.as_str() {
            "missing" => {
                return Err(SandboxError::EntryNotFound {
                    name: entry.to_string(),
                })
            }
            "returned" => Value::from_json_str(&payload)
                .map(CaseRun::Returned)
                .map_err(|e| SandboxError::Protocol(e.to_string()))?,
            "undefined" => CaseRun::Undefined,
            "threw" => CaseRun::Threw(payload),
            other => {
                return Err(SandboxError::Protocol(format!(
                    "unknown harness record kind '{}'",
                    other
                )))
            }
        };
        runs.push(run);
    }

    if runs.len() != expected_cases {
        return Err(SandboxError::Protocol(format!(
            "expected {} case records, got {}",
            expected_cases,
            runs.len()
        )));
    }
    Ok(runs)
}
