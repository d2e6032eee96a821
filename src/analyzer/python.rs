//! analyzer/python.rs
//!
//! Tree-sitter based Python function analyzer.
//!
//! Single top-down walk of the parse tree with an explicit scope stack:
//! entering a `def` pushes a scope, leaving it folds the scope's counters
//! into the running totals. Nested functions are reported as separate
//! sibling entries; counted constructs always attribute to the top of the
//! stack.

use std::cell::RefCell;

use tree_sitter::{Node, Parser};

use crate::analyzer::side_effects::{self, CallSite, ASYNC_TAG};
use crate::analyzer::types::{push_unique, AnalysisResult, FunctionInfo, ParamInfo, ParamKind};

thread_local! {
    static PY_PARSER: RefCell<Parser> = RefCell::new(make_parser());
}

fn make_parser() -> Parser {
    let mut p = Parser::new();
    p.set_language(&tree_sitter_python::language()).unwrap();
    p
}

/// Analyze one Python snippet into the normalized result contract.
pub fn analyze(code: &str) -> AnalysisResult {
    let tree = match PY_PARSER.with(|p| p.borrow_mut().parse(code, None)) {
        Some(t) => t,
        None => return AnalysisResult::failed("Analysis error: parser produced no tree"),
    };

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return AnalysisResult::failed(format!("Syntax error: invalid syntax at line {}", line));
    }

    let mut visitor = Visitor::new(code);
    visitor.walk(root);
    visitor.finish()
}

/* ============================================================
   Traversal
   ============================================================ */

struct Visitor<'s> {
    src: &'s str,
    scopes: Vec<FunctionInfo>,
    functions: Vec<FunctionInfo>,
    side_effects: Vec<String>,
    branches: u32,
    complexity: u32,
}

impl<'s> Visitor<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            scopes: Vec::new(),
            functions: Vec::new(),
            side_effects: Vec::new(),
            branches: 0,
            complexity: 0,
        }
    }

    fn finish(self) -> AnalysisResult {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();

        for func in &self.functions {
            for param in &func.inputs {
                push_unique(&mut inputs, format!("{}: {}", param.name, param.type_name));
            }
            for out in &func.outputs {
                push_unique(&mut outputs, out.clone());
            }
        }

        AnalysisResult {
            language: "python".into(),
            functions: self.functions,
            inputs,
            outputs,
            complexity: self.complexity,
            branches: self.branches,
            side_effects: self.side_effects,
            error: None,
        }
    }

    fn walk(&mut self, node: Node) {
        match node.kind() {
            "function_definition" => {
                self.visit_function(node);
                return;
            }
            "if_statement" | "elif_clause" | "for_statement" | "while_statement" => {
                self.count(1);
            }
            "try_statement" => {
                self.count(try_weight(node));
            }
            "call" => self.visit_call(node),
            kind => {
                if let Some(tag) = side_effects::classify_statement(kind) {
                    self.tag(tag);
                }
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child);
        }
    }

    fn visit_function(&mut self, node: Node) {
        let name = node
            .child_by_field_name("name")
            .and_then(|n| self.text(n))
            .unwrap_or_else(|| "<anonymous>".into());

        if node.child(0).map(|c| c.kind()) == Some("async") {
            self.tag(ASYNC_TAG);
        }

        let inputs = node
            .child_by_field_name("parameters")
            .map(|p| self.extract_params(p))
            .unwrap_or_default();

        self.scopes.push(FunctionInfo {
            name,
            inputs,
            outputs: Vec::new(),
            line_start: node.start_position().row + 1,
            line_end: node.end_position().row + 1,
            branches: 0,
            local_complexity: 1,
        });

        if let Some(body) = node.child_by_field_name("body") {
            self.walk(body);
        }

        if let Some(mut info) = self.scopes.pop() {
            info.outputs = self.extract_outputs(node);
            self.branches += info.branches;
            self.complexity += info.local_complexity;
            self.functions.push(info);
        }
    }

    fn visit_call(&mut self, node: Node) {
        let Some(func) = node.child_by_field_name("function") else {
            return;
        };

        let classified = match func.kind() {
            "identifier" => self
                .text(func)
                .and_then(|name| side_effects::classify_call(&name, CallSite::Function)),
            "attribute" => func
                .child_by_field_name("attribute")
                .and_then(|n| self.text(n))
                .and_then(|name| side_effects::classify_call(&name, CallSite::Attribute)),
            _ => None,
        };

        if let Some(tag) = classified {
            self.tag(tag);
        }
    }

    /// Branch/complexity accounting for the innermost enclosing function.
    /// Constructs outside any function are not counted.
    fn count(&mut self, weight: u32) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.branches += weight;
            scope.local_complexity += weight;
        }
    }

    fn tag(&mut self, tag: &str) {
        push_unique(&mut self.side_effects, tag);
    }

    fn text(&self, node: Node) -> Option<String> {
        node.utf8_text(self.src.as_bytes()).ok().map(str::to_owned)
    }

    /* ---------- parameters ---------- */

    fn extract_params(&self, params: Node) -> Vec<ParamInfo> {
        let mut out = Vec::new();
        let mut keyword_only = false;

        let mut cursor = params.walk();
        for child in params.children(&mut cursor) {
            match child.kind() {
                "identifier" => {
                    if let Some(name) = self.text(child) {
                        out.push(ParamInfo {
                            name,
                            type_name: "Any".into(),
                            kind: plain_kind(keyword_only),
                        });
                    }
                }
                "typed_parameter" => {
                    if let Some(param) = self.typed_param(child, keyword_only) {
                        out.push(param);
                    }
                }
                "default_parameter" => {
                    if let Some(name) =
                        child.child_by_field_name("name").and_then(|n| self.text(n))
                    {
                        out.push(ParamInfo {
                            name,
                            type_name: "Any".into(),
                            kind: plain_kind(keyword_only),
                        });
                    }
                }
                "typed_default_parameter" => {
                    let name = child.child_by_field_name("name").and_then(|n| self.text(n));
                    let type_name = child
                        .child_by_field_name("type")
                        .map(|t| resolve_type(t, self.src))
                        .unwrap_or_else(|| "Any".into());
                    if let Some(name) = name {
                        out.push(ParamInfo {
                            name,
                            type_name,
                            kind: plain_kind(keyword_only),
                        });
                    }
                }
                "list_splat_pattern" => {
                    if let Some(param) = self.splat_param(child, ParamKind::Varargs, "*", "tuple") {
                        out.push(param);
                    }
                    // params after *args are keyword-only
                    keyword_only = true;
                }
                "dictionary_splat_pattern" => {
                    if let Some(param) = self.splat_param(child, ParamKind::Kwargs, "**", "dict") {
                        out.push(param);
                    }
                }
                "keyword_separator" => keyword_only = true,
                _ => {}
            }
        }

        out
    }

    /// `x: int`, but also `*args: int` where the splat pattern nests
    /// inside the typed parameter.
    fn typed_param(&self, node: Node, keyword_only: bool) -> Option<ParamInfo> {
        let inner = node.named_child(0)?;
        let type_name = node
            .child_by_field_name("type")
            .map(|t| resolve_type(t, self.src))
            .unwrap_or_else(|| "Any".into());

        match inner.kind() {
            "identifier" => Some(ParamInfo {
                name: self.text(inner)?,
                type_name,
                kind: plain_kind(keyword_only),
            }),
            "list_splat_pattern" => {
                let name = inner.named_child(0).and_then(|n| self.text(n))?;
                Some(ParamInfo {
                    name: format!("*{}", name),
                    type_name,
                    kind: ParamKind::Varargs,
                })
            }
            "dictionary_splat_pattern" => {
                let name = inner.named_child(0).and_then(|n| self.text(n))?;
                Some(ParamInfo {
                    name: format!("**{}", name),
                    type_name,
                    kind: ParamKind::Kwargs,
                })
            }
            _ => None,
        }
    }

    fn splat_param(
        &self,
        node: Node,
        kind: ParamKind,
        prefix: &str,
        default_type: &str,
    ) -> Option<ParamInfo> {
        let name = node.named_child(0).and_then(|n| self.text(n))?;
        Some(ParamInfo {
            name: format!("{}{}", prefix, name),
            type_name: default_type.into(),
            kind,
        })
    }

    /* ---------- return types ---------- */

    fn extract_outputs(&self, func: Node) -> Vec<String> {
        if let Some(annotation) = func.child_by_field_name("return_type") {
            return vec![resolve_type(annotation, self.src)];
        }

        let mut out = Vec::new();
        if let Some(body) = func.child_by_field_name("body") {
            collect_return_types(body, &mut out);
        }
        if out.is_empty() {
            out.push("Any".into());
        }
        out
    }
}

fn plain_kind(keyword_only: bool) -> ParamKind {
    if keyword_only {
        ParamKind::KeywordOnly
    } else {
        ParamKind::Positional
    }
}

/// try + each handler + else + finally, applied to branches and complexity
/// alike.
fn try_weight(node: Node) -> u32 {
    let mut weight = 1;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "except_clause" | "except_group_clause" => weight += 1,
            "else_clause" | "finally_clause" => weight += 1,
            _ => {}
        }
    }
    weight
}

/// Infer a canonical type name from the literal shape of a returned
/// expression. Closed set by design; anything else is not inferable.
fn infer_literal_type(node: Node) -> Option<&'static str> {
    match node.kind() {
        "true" | "false" => Some("bool"),
        "integer" => Some("int"),
        "float" => Some("float"),
        "string" | "concatenated_string" => Some("str"),
        "none" => Some("None"),
        "list" => Some("list"),
        "dictionary" => Some("dict"),
        "tuple" | "expression_list" => Some("tuple"),
        "set" => Some("set"),
        _ => None,
    }
}

/// Collect inferred types from `return` statements, deduplicated in
/// first-seen order. Does not descend into nested function definitions:
/// their returns belong to their own scope.
fn collect_return_types(node: Node, out: &mut Vec<String>) {
    if node.kind() == "function_definition" {
        return;
    }

    if node.kind() == "return_statement" {
        if let Some(value) = node.named_child(0) {
            if let Some(inferred) = infer_literal_type(value) {
                push_unique(out, inferred);
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_return_types(child, out);
    }
}

/// Render a type annotation as a display string: dotted names and
/// subscripted generics resolve recursively, unknown shapes collapse to
/// `Complex`.
fn resolve_type(node: Node, src: &str) -> String {
    let text = |n: Node| {
        n.utf8_text(src.as_bytes())
            .map(str::to_owned)
            .unwrap_or_else(|_| "Complex".into())
    };

    match node.kind() {
        "type" => node
            .named_child(0)
            .map(|inner| resolve_type(inner, src))
            .unwrap_or_else(|| "Any".into()),
        "identifier" => text(node),
        "none" => "None".into(),
        "string" => text(node).trim_matches(['"', '\'']).to_string(),
        "attribute" => {
            let object = node
                .child_by_field_name("object")
                .map(|o| resolve_type(o, src))
                .unwrap_or_else(|| "Complex".into());
            let attr = node
                .child_by_field_name("attribute")
                .map(text)
                .unwrap_or_else(|| "Complex".into());
            format!("{}.{}", object, attr)
        }
        "subscript" => {
            let value = node
                .child_by_field_name("value")
                .map(|v| resolve_type(v, src))
                .unwrap_or_else(|| "Complex".into());
            let mut cursor = node.walk();
            let subs: Vec<String> = node
                .children_by_field_name("subscript", &mut cursor)
                .map(|s| resolve_type(s, src))
                .collect();
            format!("{}[{}]", value, subs.join(", "))
        }
        "generic_type" => {
            let base = node
                .named_child(0)
                .map(|b| resolve_type(b, src))
                .unwrap_or_else(|| "Complex".into());
            let params: Vec<String> = node
                .named_child(1)
                .map(|tp| {
                    let mut cursor = tp.walk();
                    tp.named_children(&mut cursor)
                        .map(|p| resolve_type(p, src))
                        .collect()
                })
                .unwrap_or_default();
            if params.is_empty() {
                base
            } else {
                format!("{}[{}]", base, params.join(", "))
            }
        }
        _ => "Complex".into(),
    }
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(line) = first_error_line(child) {
            return Some(line);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::types::ParamKind;

    #[test]
    fn single_branch_function() {
        let result = analyze("def f(x: int) -> int:\n    if x > 0:\n        return x\n    return -x\n");

        assert!(result.error.is_none());
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].name, "f");
        assert_eq!(result.branches, 1);
        assert_eq!(result.complexity, 2);
        assert_eq!(result.inputs, vec!["x: int"]);
        assert_eq!(result.outputs, vec!["int"]);
        assert!(result.side_effects.is_empty());
    }

    #[test]
    fn print_call_tags_io() {
        let result = analyze("def f():\n    print(\"hi\")\n");

        assert_eq!(result.branches, 0);
        assert_eq!(result.complexity, 1);
        assert!(result.side_effects.iter().any(|s| s == "io_operations"));
    }

    #[test]
    fn try_statement_weights() {
        let source = r#"
def guarded():
    try:
        risky()
    except ValueError:
        pass
    except KeyError:
        pass
    else:
        pass
    finally:
        pass
"#;
        let result = analyze(source);

        // try + 2 handlers + else + finally
        assert_eq!(result.branches, 5);
        assert_eq!(result.complexity, 6);
    }

    #[test]
    fn elif_counts_as_branch() {
        let source = r#"
def pick(x):
    if x > 10:
        return "big"
    elif x > 5:
        return "mid"
    return "small"
"#;
        let result = analyze(source);

        assert_eq!(result.branches, 2);
        assert_eq!(result.complexity, 3);
        assert_eq!(result.outputs, vec!["str"]);
    }

    #[test]
    fn parameter_kinds() {
        let source = "def f(a, b: str, *args, key: int = 0, **opts):\n    pass\n";
        let result = analyze(source);

        let params = &result.functions[0].inputs;
        assert_eq!(params.len(), 5);
        assert_eq!(params[0].kind, ParamKind::Positional);
        assert_eq!(params[1].type_name, "str");
        assert_eq!(params[2].name, "*args");
        assert_eq!(params[2].kind, ParamKind::Varargs);
        assert_eq!(params[2].type_name, "tuple");
        assert_eq!(params[3].kind, ParamKind::KeywordOnly);
        assert_eq!(params[3].type_name, "int");
        assert_eq!(params[4].name, "**opts");
        assert_eq!(params[4].kind, ParamKind::Kwargs);
        assert_eq!(params[4].type_name, "dict");
    }

    #[test]
    fn generic_and_dotted_annotations() {
        let source =
            "def f(items: typing.List[int], table: Dict[str, int]) -> Optional[str]:\n    pass\n";
        let result = analyze(source);

        assert_eq!(
            result.inputs,
            vec!["items: typing.List[int]", "table: Dict[str, int]"]
        );
        assert_eq!(result.outputs, vec!["Optional[str]"]);
    }

    #[test]
    fn return_inference_from_literals() {
        let source = r#"
def shape(flag):
    if flag:
        return []
    return {}
"#;
        let result = analyze(source);
        assert_eq!(result.outputs, vec!["list", "dict"]);
    }

    #[test]
    fn nested_functions_are_separate_entries() {
        let source = r#"
def outer(x):
    def inner(y):
        if y:
            return 1
        return 0
    if x:
        return inner(x)
    return None
"#;
        let result = analyze(source);

        assert_eq!(result.functions.len(), 2);
        let inner = result.functions.iter().find(|f| f.name == "inner").unwrap();
        let outer = result.functions.iter().find(|f| f.name == "outer").unwrap();
        assert_eq!(inner.branches, 1);
        assert_eq!(outer.branches, 1);
        assert_eq!(result.complexity, 4);
        assert_eq!(result.branches, 2);
    }

    #[test]
    fn async_function_tags_async_operations() {
        let result = analyze("async def fetch(url):\n    return await go(url)\n");
        assert!(result.side_effects.iter().any(|s| s == "async_operations"));
    }

    #[test]
    fn global_and_with_statements_tag() {
        let source = r#"
def f():
    global counter
    with open("x") as fh:
        fh.read()
"#;
        let result = analyze(source);
        assert!(result.side_effects.iter().any(|s| s == "global_state"));
        assert!(result.side_effects.iter().any(|s| s == "context_managers"));
        assert!(result.side_effects.iter().any(|s| s == "io_operations"));
    }

    #[test]
    fn syntax_error_reports_no_metrics() {
        let result = analyze("def broken(:\n    pass\n");

        let err = result.error.as_deref().unwrap();
        assert!(err.starts_with("Syntax error:"), "got {err}");
        assert!(result.functions.is_empty());
        assert_eq!(result.complexity, 0);
    }

    #[test]
    fn module_level_branches_ignored() {
        let source = r#"
if True:
    x = 1

def f():
    return x
"#;
        let result = analyze(source);
        assert_eq!(result.branches, 0);
        assert_eq!(result.complexity, 1);
    }
}
