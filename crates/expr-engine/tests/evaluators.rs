//! Bulk binding of host objects through `Parser::parse_evaluators`.

use expr_engine::{CompiledExpression, Context, Evaluable, Evaluator, Parser, SyntaxError, Value, Vars};

#[derive(Debug)]
struct Filter {
    expr: String,
    eval: Option<CompiledExpression>,
}

impl Filter {
    fn new(expr: &str) -> Self {
        Filter {
            expr: expr.to_string(),
            eval: None,
        }
    }
}

impl Evaluator for Filter {
    fn expr(&self) -> &str {
        &self.expr
    }

    fn set_eval(&mut self, eval: CompiledExpression) {
        self.eval = Some(eval);
    }
}

#[test]
fn test_batch_binds_every_item() {
    let mut filters = vec![Filter::new("a > 1"), Filter::new("len(name) == 3")];
    Parser::default()
        .parse_evaluators(filters.iter_mut())
        .unwrap();

    let vars = Vars::new().with("a", 2).with("name", "ann");
    for filter in &filters {
        let compiled = filter.eval.as_ref().unwrap();
        assert!(compiled.test(&Context::background(), &vars).unwrap());
    }
}

#[test]
fn test_batch_failure_keeps_earlier_bindings() {
    let mut filters = vec![
        Filter::new("1"),
        Filter::new("a == 2"),
        Filter::new("a =="),
        Filter::new("true"),
    ];
    let err = Parser::default()
        .parse_evaluators(filters.iter_mut())
        .unwrap_err();
    assert!(matches!(err, SyntaxError::UnexpectedEnd { .. }), "got {:?}", err);

    let bound: Vec<bool> = filters.iter().map(|f| f.eval.is_some()).collect();
    assert_eq!(bound, vec![true, true, false, false]);

    let vars = Vars::new().with("a", 2);
    let second = filters[1].eval.as_ref().unwrap();
    assert_eq!(
        second.eval(&Context::background(), &vars).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_batch_unknown_function_stops() {
    let mut filters = vec![Filter::new("nope()"), Filter::new("1")];
    let err = Parser::default()
        .parse_evaluators(filters.iter_mut())
        .unwrap_err();
    assert!(matches!(err, SyntaxError::UnknownFunction { .. }));
    assert!(filters.iter().all(|f| f.eval.is_none()));
}

#[test]
fn test_rebinding_replaces_compiled_form() {
    let parser = Parser::default();
    let mut filter = Filter::new("1");
    parser.parse_evaluators([&mut filter]).unwrap();
    filter.expr = "2".to_string();
    parser.parse_evaluators([&mut filter]).unwrap();
    assert_eq!(filter.eval.as_ref().unwrap().source(), "2");
}

#[test]
fn test_empty_batch() {
    let mut filters: Vec<Filter> = Vec::new();
    assert!(Parser::default()
        .parse_evaluators(filters.iter_mut())
        .is_ok());
}
