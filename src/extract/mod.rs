pub mod dataset;

use std::collections::HashMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};
use crate::parser::calls::calls_of_definition;
use crate::parser::definitions::collect_definitions;
use crate::parser::{Frontend, PythonFrontend};
use crate::telemetry::{Event, EventSink, TracingSink};

pub use dataset::{CallEdge, Dataset};

/// Default upper bound on input size: 4 MiB.
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 4 * 1024 * 1024;

/// How calls are attributed when several definitions share a name.
///
/// The snippet always comes from the last definition; this only decides the edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The last definition is authoritative: its calls replace earlier ones.
    #[default]
    LastWins,
    /// Every definition with the name contributes its own edges, so a pair
    /// called from two definitions appears twice.
    Union,
}

/// Knobs for a [`CallGraphBuilder`]. Deserialised from the `[extract]` table
/// of `code-flow.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub duplicates: DuplicatePolicy,
    /// Treat `async def` as a function definition.
    pub include_async: bool,
    /// Reject input larger than this many bytes. `None` disables the guard.
    pub max_source_bytes: Option<usize>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::LastWins,
            include_async: true,
            max_source_bytes: Some(DEFAULT_MAX_SOURCE_BYTES),
        }
    }
}

/// Builds a [`Dataset`] from source text.
///
/// Holds no per-extraction state, so one builder can serve many threads at
/// once when `F` and `S` are `Sync`.
#[derive(Debug, Clone, Default)]
pub struct CallGraphBuilder<F = PythonFrontend, S = TracingSink> {
    frontend: F,
    sink: S,
    options: ExtractOptions,
}

impl<F: Frontend, S: EventSink> CallGraphBuilder<F, S> {
    pub fn new(frontend: F, sink: S) -> Self {
        Self {
            frontend,
            sink,
            options: ExtractOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the call graph, degrading to an empty [`Dataset`] on any failure.
    ///
    /// The failure is recorded as [`Event::ExtractionFailed`] on the sink and is
    /// otherwise invisible to the caller; use [`Self::try_extract`] to tell
    /// empty input apart from malformed input.
    pub fn extract(&self, source: &str) -> Dataset {
        match self.try_extract(source) {
            Ok(dataset) => dataset,
            Err(err) => {
                self.sink.record(&Event::ExtractionFailed {
                    kind: err.kind(),
                    reason: err.to_string(),
                });
                Dataset::default()
            }
        }
    }

    /// Extract the call graph.
    ///
    /// # Errors
    /// - [`ExtractError::TooLarge`] if `source` exceeds `max_source_bytes`
    /// - [`ExtractError::Syntax`] if `source` does not parse
    /// - [`ExtractError::Frontend`] / [`ExtractError::MalformedTree`] on internal faults
    pub fn try_extract(&self, source: &str) -> Result<Dataset> {
        if let Some(limit) = self.options.max_source_bytes
            && source.len() > limit
        {
            return Err(ExtractError::TooLarge {
                size: source.len(),
                limit,
            });
        }

        let tree = self.frontend.parse(source)?;
        let kinds = tree.kinds();
        let definitions = collect_definitions(&tree, source, self.options.include_async)?;

        let mut dataset = Dataset::default();
        // One slot per visited definition; LastWins empties a name's earlier slot.
        let mut groups: Vec<Option<(&str, IndexSet<String>)>> =
            Vec::with_capacity(definitions.len());
        let mut latest: HashMap<&str, usize> = HashMap::new();

        for def in &definitions {
            self.sink.record(&Event::FunctionFound {
                name: def.name.clone(),
                line: def.line(),
            });
            dataset.functions.insert(def.name.clone());

            let snippet = def.span.slice(source).ok_or_else(|| {
                ExtractError::MalformedTree(format!(
                    "span {}..{} of `{}` lies outside the source",
                    def.span.start_byte, def.span.end_byte, def.name
                ))
            })?;
            // insert() on an existing key replaces the value in place.
            dataset.code.insert(def.name.clone(), snippet.to_owned());
            self.sink.record(&Event::SnippetExtracted {
                name: def.name.clone(),
                bytes: snippet.len(),
            });

            let calls = calls_of_definition(def, source, kinds)?;
            for (object, attribute) in calls.attribute_calls {
                self.sink.record(&Event::AttributeCallSkipped {
                    caller: def.name.clone(),
                    object,
                    attribute,
                });
            }

            if self.options.duplicates == DuplicatePolicy::LastWins
                && let Some(prev) = latest.insert(def.name.as_str(), groups.len())
            {
                groups[prev] = None;
            }
            groups.push(Some((def.name.as_str(), calls.callees)));
        }

        for (caller, callees) in groups.into_iter().flatten() {
            for callee in callees {
                self.sink.record(&Event::CallFound {
                    caller: caller.to_owned(),
                    callee: callee.clone(),
                });
                dataset.calls.push(CallEdge::new(caller.to_owned(), callee));
            }
        }

        self.sink.record(&Event::Extracted {
            functions: dataset.functions.len(),
            calls: dataset.calls.len(),
        });

        Ok(dataset)
    }
}

/// Extract with the Python front end, default options, and `tracing` diagnostics.
pub fn extract(source: &str) -> Dataset {
    CallGraphBuilder::<PythonFrontend, TracingSink>::default().extract(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyntaxTree;
    use crate::telemetry::{MemorySink, NullSink};

    const BASIC: &str = r#"
def main():
    helper()
    foo()

def helper():
    print("helping")

def foo():
    bar()

def bar():
    pass
"#;

    fn builder(options: ExtractOptions) -> CallGraphBuilder<PythonFrontend, NullSink> {
        CallGraphBuilder::new(PythonFrontend, NullSink).with_options(options)
    }

    fn names(d: &Dataset) -> Vec<&str> {
        d.functions.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_basic_functions_and_calls() {
        let d = extract(BASIC);
        assert_eq!(names(&d), vec!["main", "helper", "foo", "bar"]);
        assert!(d.has_edge("main", "helper"));
        assert!(d.has_edge("main", "foo"));
        assert!(d.has_edge("foo", "bar"));
        assert!(d.has_edge("helper", "print"), "builtins are kept as dangling callees");
        assert_eq!(d.code["bar"].trim_end(), "def bar():\n    pass");
        assert_eq!(d.code["main"].trim_end(), "def main():\n    helper()\n    foo()");
    }

    #[test]
    fn test_edges_grouped_by_caller_in_visit_order() {
        let d = extract(BASIC);
        let pairs: Vec<(&str, &str)> = d
            .calls
            .iter()
            .map(|e| (e.caller.as_str(), e.callee.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("main", "helper"),
                ("main", "foo"),
                ("helper", "print"),
                ("foo", "bar"),
            ]
        );
    }

    #[test]
    fn test_single_line_definitions() {
        let src = "def main(): helper(); foo()\ndef helper(): print(\"x\")\ndef foo(): bar()\ndef bar(): pass\n";
        let d = extract(src);
        assert_eq!(d.functions.len(), 4);
        assert!(d.has_edge("main", "helper"));
        assert!(d.has_edge("main", "foo"));
        assert!(d.has_edge("foo", "bar"));
        assert!(d.code["bar"].contains("def bar(): pass"));
    }

    #[test]
    fn test_distinct_definitions_counted() {
        let src = (0..25)
            .map(|i| format!("def f{i}():\n    g{i}()\n"))
            .collect::<Vec<_>>()
            .join("\n");
        let d = extract(&src);
        assert_eq!(d.functions.len(), 25);
        assert_eq!(d.code.len(), 25);
        assert_eq!(d.calls.len(), 25);
    }

    #[test]
    fn test_idempotent() {
        let first = extract(BASIC);
        let second = extract(BASIC);
        assert_eq!(first, second);
        assert_eq!(first.calls, second.calls, "edge order must be stable too");
    }

    #[test]
    fn test_empty_source() {
        let d = extract("");
        assert!(d.is_empty());
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            serde_json::json!({ "functions": [], "calls": [], "code": {} })
        );
    }

    #[test]
    fn test_syntax_error_degrades_to_empty() {
        let sink = MemorySink::new();
        let b = CallGraphBuilder::new(PythonFrontend, &sink);
        let d = b.extract("def foo(");
        assert!(d.is_empty());
        let failed = sink
            .events()
            .into_iter()
            .any(|e| matches!(e, Event::ExtractionFailed { kind: "syntax", .. }));
        assert!(failed, "failure must reach the sink");
    }

    #[test]
    fn test_try_extract_surfaces_syntax_error() {
        let err = builder(ExtractOptions::default())
            .try_extract("def foo(")
            .unwrap_err();
        assert!(matches!(err, ExtractError::Syntax(_)), "got {err:?}");
        assert!(builder(ExtractOptions::default()).try_extract("").is_ok());
    }

    #[test]
    fn test_module_level_calls_ignored() {
        let d = extract("print(\"hello world\")\nx = 5\n");
        assert!(d.is_empty());
    }

    #[test]
    fn test_nested_definitions() {
        let src = "\ndef outer():\n    def inner():\n        pass\n    inner()\nouter()\n";
        let d = extract(src);
        assert_eq!(names(&d), vec!["outer", "inner"]);
        assert!(d.has_edge("outer", "inner"));
        assert_eq!(d.calls.len(), 1, "module-level outer() is not an edge");
        assert!(d.code["outer"].contains("def inner():"));
        assert!(!d.code["inner"].contains("outer"));
    }

    #[test]
    fn test_duplicate_names_last_snippet_wins() {
        let src = "\ndef foo():\n    pass\n\ndef foo():\n    print(\"y\")\n    ";
        let d = extract(src);
        assert_eq!(d.functions.iter().filter(|n| *n == "foo").count(), 1);
        assert_eq!(d.code["foo"].trim_end(), "def foo():\n    print(\"y\")");
    }

    #[test]
    fn test_duplicate_policy_last_wins() {
        let src = "def foo():\n    a()\n\ndef other():\n    b()\n\ndef foo():\n    c()\n";
        let d = builder(ExtractOptions::default()).extract(src);
        assert!(!d.has_edge("foo", "a"), "earlier definition's calls are replaced");
        assert!(d.has_edge("foo", "c"));
        let callers: Vec<&str> = d.calls.iter().map(|e| e.caller.as_str()).collect();
        assert_eq!(callers, vec!["other", "foo"], "replacement edges sit at the last visit");
    }

    #[test]
    fn test_duplicate_policy_union() {
        let src = "def foo():\n    a()\n    shared()\n\ndef foo():\n    c()\n    shared()\n";
        let d = builder(ExtractOptions {
            duplicates: DuplicatePolicy::Union,
            ..ExtractOptions::default()
        })
        .extract(src);
        assert!(d.has_edge("foo", "a"));
        assert!(d.has_edge("foo", "c"));
        let pairs: Vec<&str> = d.calls.iter().map(|e| e.callee.as_str()).collect();
        assert_eq!(pairs, vec!["a", "shared", "c", "shared"], "each definition keeps its own edges");
        assert_eq!(d.code["foo"].trim_end(), "def foo():\n    c()\n    shared()");
    }

    #[test]
    fn test_union_repeats_identical_definitions() {
        let src = "def foo():\n    bar()\n\ndef foo():\n    bar()\n";
        let d = builder(ExtractOptions {
            duplicates: DuplicatePolicy::Union,
            ..ExtractOptions::default()
        })
        .extract(src);
        assert_eq!(d.functions.len(), 1);
        assert_eq!(d.calls.len(), 2);
        assert!(d.calls.iter().all(|e| e.caller == "foo" && e.callee == "bar"));
    }

    #[test]
    fn test_many_redefinitions() {
        let src: String = (0..5000).map(|i| format!("def f():\n    g{i}()\n")).collect();

        let last = builder(ExtractOptions::default()).extract(&src);
        assert_eq!(last.functions.len(), 1);
        assert_eq!(last.calls, vec![CallEdge::new("f", "g4999")]);
        assert_eq!(last.code["f"], "def f():\n    g4999()");

        let union = builder(ExtractOptions {
            duplicates: DuplicatePolicy::Union,
            ..ExtractOptions::default()
        })
        .extract(&src);
        assert_eq!(union.functions.len(), 1);
        assert_eq!(union.calls.len(), 5000);
        assert_eq!(union.calls[0].callee, "g0");
        assert_eq!(union.calls[4999].callee, "g4999");
    }

    #[test]
    fn test_replaced_calls_not_reported() {
        let sink = MemorySink::new();
        let src = "def foo():\n    a()\n\ndef other():\n    b()\n\ndef foo():\n    c()\n";
        let d = CallGraphBuilder::new(PythonFrontend, &sink).extract(src);
        let reported: Vec<(String, String)> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::CallFound { caller, callee } => Some((caller, callee)),
                _ => None,
            })
            .collect();
        let kept: Vec<(String, String)> = d
            .calls
            .iter()
            .map(|e| (e.caller.clone(), e.callee.clone()))
            .collect();
        assert_eq!(reported, kept);
        assert!(!reported.contains(&("foo".to_string(), "a".to_string())));
    }

    #[test]
    fn test_member_calls_reach_sink() {
        let sink = MemorySink::new();
        let d = CallGraphBuilder::new(PythonFrontend, &sink)
            .extract("def run(self):\n    self.render()\n    draw()\n");
        assert_eq!(d.calls, vec![CallEdge::new("run", "draw")]);
        let skipped: Vec<Event> = sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::AttributeCallSkipped { .. }))
            .collect();
        assert_eq!(
            skipped,
            vec![Event::AttributeCallSkipped {
                caller: "run".into(),
                object: "self".into(),
                attribute: "render".into(),
            }]
        );
    }

    #[test]
    fn test_call_to_undefined_function() {
        let d = extract("\ndef main():\n    not_defined()\n");
        assert!(d.contains_function("main"));
        assert!(d.has_edge("main", "not_defined"));
        assert_eq!(d.dangling_edges().count(), 1);
    }

    #[test]
    fn test_callers_always_defined() {
        let src = "def a():\n    b()\n    x.y()\n    def c():\n        d()\n";
        let d = extract(src);
        assert!(d.calls.iter().all(|e| d.contains_function(&e.caller)));
    }

    #[test]
    fn test_async_excluded_when_disabled() {
        let src = "async def fetch():\n    get()\n\ndef main():\n    fetch()\n";
        let with = extract(src);
        assert!(with.contains_function("fetch"));

        let without = builder(ExtractOptions {
            include_async: false,
            ..ExtractOptions::default()
        })
        .extract(src);
        assert!(!without.contains_function("fetch"));
        assert!(without.has_edge("main", "fetch"), "still a dangling callee");
    }

    #[test]
    fn test_size_guard() {
        let b = builder(ExtractOptions {
            max_source_bytes: Some(8),
            ..ExtractOptions::default()
        });
        let err = b.try_extract("def main():\n    pass\n").unwrap_err();
        assert!(matches!(err, ExtractError::TooLarge { limit: 8, .. }));
        assert!(b.extract("def main():\n    pass\n").is_empty());
    }

    #[test]
    fn test_non_ascii_snippet() {
        let src = "def grüße():\n    return \"héllo\"\n";
        let d = extract(src);
        assert_eq!(d.code["grüße"].trim_end(), "def grüße():\n    return \"héllo\"");
    }

    #[test]
    fn test_sink_sees_every_step() {
        let sink = MemorySink::new();
        CallGraphBuilder::new(PythonFrontend, &sink).extract("def a():\n    b()\n");
        let events = sink.events();
        assert_eq!(events.len(), 4, "got {events:?}");
        assert_eq!(
            events[0],
            Event::FunctionFound {
                name: "a".into(),
                line: 1
            }
        );
        assert!(matches!(&events[1], Event::SnippetExtracted { name, bytes } if name == "a" && *bytes > 0));
        assert_eq!(
            events[2],
            Event::CallFound {
                caller: "a".into(),
                callee: "b".into()
            }
        );
        assert_eq!(
            events[3],
            Event::Extracted {
                functions: 1,
                calls: 1
            }
        );
    }

    struct FailingFrontend;

    impl Frontend for FailingFrontend {
        fn parse(&self, _source: &str) -> Result<SyntaxTree> {
            Err(ExtractError::Frontend("grammar unavailable".into()))
        }
    }

    #[test]
    fn test_internal_fault_degrades_to_empty() {
        let sink = MemorySink::new();
        let d = CallGraphBuilder::new(FailingFrontend, &sink).extract("def a(): pass\n");
        assert!(d.is_empty());
        assert!(
            sink.events()
                .iter()
                .any(|e| matches!(e, Event::ExtractionFailed { kind: "frontend", .. }))
        );
    }
}
