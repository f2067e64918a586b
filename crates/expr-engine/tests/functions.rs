//! Built-in function libraries, exercised through expressions.

use expr_engine::{Context, Evaluable, EvalError, Parser, SyntaxError, Vars};
use serde_json::{json, Value as Json};

fn eval(expression: &str, data: Json) -> Result<Json, EvalError> {
    let compiled = Parser::default()
        .parse(expression)
        .unwrap_or_else(|e| panic!("parse({}) failed: {}", expression, e));
    let vars = Vars::from_json(data).expect("scope must be a JSON object");
    compiled
        .eval(&Context::background(), &vars)
        .map(|v| v.into_json())
}

fn check(expression: &str, expected: Json) {
    check_with(expression, expected, json!({}));
}

fn check_with(expression: &str, expected: Json, data: Json) {
    let result = eval(expression, data)
        .unwrap_or_else(|e| panic!("eval({}) failed: {}", expression, e));
    assert_eq!(result, expected, "expression: {}", expression);
}

fn check_err(expression: &str) -> EvalError {
    eval(expression, json!({}))
        .err()
        .unwrap_or_else(|| panic!("expected error for {}", expression))
}

// ----------------------------------------------------------------- Generic

#[test]
fn test_generic() {
    check("len('héllo')", json!(5));
    check("length([1, 2])", json!(2));
    check("len({a: 1})", json!(1));
    check("len(null)", json!(0));
    check("isEmpty([])", json!(true));
    check("isEmpty(0.5)", json!(false));
    check("isNil(null)", json!(true));
    check("coalesce(null, '', 0, 'x', 'y')", json!("x"));
    check("coalesce(null, '')", json!(null));
    check("typeOf({})", json!("map"));
    check("typeOf(parseISOTime('2020-01-01T00:00:00Z'))", json!("timestamp"));
    check("default('', 'fallback')", json!("fallback"));
    check("default('set', 'fallback')", json!("set"));
    assert!(matches!(check_err("len(1)"), EvalError::TypeMismatch { .. }));
}

// ----------------------------------------------------------------- String

#[test]
fn test_string_basics() {
    check("trim('  a b  ')", json!("a b"));
    check("trimLeft('  a ')", json!("a "));
    check("trimRight('  a ')", json!("  a"));
    check("toLower('AbC')", json!("abc"));
    check("toUpper('AbC')", json!("ABC"));
    check("title('hello big world')", json!("Hello Big World"));
    check("hasPrefix('foobar', 'foo')", json!(true));
    check("hasSuffix('foobar', 'foo')", json!(false));
    check("hasSubstring('FooBar', 'oob')", json!(false));
    check("hasSubstring('FooBar', 'oob', false)", json!(true));
}

#[test]
fn test_string_slicing() {
    check("substring('hello', 1, 3)", json!("el"));
    check("substring('hello', 2)", json!("llo"));
    check("substring('hello', 1, 99)", json!("ello"));
    assert!(matches!(
        check_err("substring('hello', 9)"),
        EvalError::IndexOutOfBounds { index: 9, len: 5 }
    ));
    check("split('a,b,c', ',')", json!(["a", "b", "c"]));
    check("split('a,b,c', ',', 2)", json!(["a", "b,c"]));
    check("split('abc', '')", json!(["a", "b", "c"]));
    check("join(['a', 1, true], '-')", json!("a-1-true"));
    check("join(['a', 'b'])", json!("ab"));
}

#[test]
fn test_string_transforms() {
    check("replace('aaa', 'a', 'b')", json!("bbb"));
    check("replace('aaa', 'a', 'b', 2)", json!("bba"));
    check("repeat('ab', 3)", json!("ababab"));
    check("shorten('hello world', 'char', 5)", json!("hello \u{2026}"));
    check("shorten('one two three', 'word', 2)", json!("one two \u{2026}"));
    check("shorten('short', 'char', 10)", json!("short"));
    check("match('abc123', '\\\\d+')", json!(true));
    check("base64encode('hello')", json!("aGVsbG8="));
    check("base64decode('aGVsbG8=')", json!("hello"));
    assert!(matches!(check_err("repeat('a', -1)"), EvalError::Function { .. }));
    assert!(matches!(
        check_err("repeat('ab', 9007199254740991)"),
        EvalError::Function { .. }
    ));
    assert!(matches!(
        check_err("repeat('x', 16777217)"),
        EvalError::Function { .. }
    ));
    check("len(repeat('x', 16777216))", json!(16777216));
    assert!(matches!(check_err("match('a', '(')"), EvalError::InvalidRegex { .. }));
    assert!(matches!(check_err("base64decode('***')"), EvalError::Function { .. }));
}

#[test]
fn test_format() {
    check("format('%s is %d', 'x', 4)", json!("x is 4"));
    check("format('%.2f%%', 12.346)", json!("12.35%"));
    check("format('%v', [1, 2])", json!("[1,2]"));
    assert!(matches!(check_err("format('%s')"), EvalError::Function { .. }));
    assert!(matches!(check_err("format('%q', 1)"), EvalError::Function { .. }));
    check("format('%.f', 2.6)", json!("3"));
    check("format('%.17f', 0.5)", json!("0.50000000000000000"));
    assert!(matches!(
        check_err("len(format('%.4000000000f', 1))"),
        EvalError::Function { .. }
    ));
    assert!(matches!(
        check_err("format('%.99999999999999999999f', 1)"),
        EvalError::Function { .. }
    ));
}

// ----------------------------------------------------------------- JSON

#[test]
fn test_json() {
    check("toJSON({b: 1, a: [true, null]})", json!(r#"{"a":[true,null],"b":1}"#));
    check("parseJSON('{\"a\": [1, 2]}').a[1]", json!(2));
    assert!(matches!(check_err("parseJSON('{')"), EvalError::Function { .. }));
}

// ----------------------------------------------------------------- Numeric

#[test]
fn test_numeric() {
    check("min(3, 1, 2)", json!(1));
    check("max([3, 1, 2])", json!(3));
    check("round(2.5)", json!(3));
    check("round(1.2345, 2)", json!(1.23));
    check("floor(-1.5)", json!(-2));
    check("ceil(1.1)", json!(2));
    check("abs(-4)", json!(4));
    check("pow(2, 10)", json!(1024));
    check("sqrt(9)", json!(3));
    check("log(8, 2)", json!(3));
    check("int('42')", json!(42));
    check("int(-3.7)", json!(-3));
    check("float('1.5')", json!(1.5));
    assert!(matches!(check_err("sqrt(-1)"), EvalError::Function { .. }));
    assert!(matches!(check_err("log(0)"), EvalError::Function { .. }));
    assert!(matches!(check_err("min([])"), EvalError::Function { .. }));
    assert!(matches!(check_err("int('x')"), EvalError::TypeMismatch { .. }));
}

// ----------------------------------------------------------------- Time

#[test]
fn test_time_parsing_and_formatting() {
    check(
        "strftime(parseISOTime('2021-03-04T05:06:07Z'), '%Y/%m/%d %H:%M')",
        json!("2021/03/04 05:06"),
    );
    check(
        "parseTime('04.03.2021', '%d.%m.%Y')",
        json!("2021-03-04T00:00:00Z"),
    );
    check(
        "parseTime('2021-03-04 10:00 +0200', '%Y-%m-%d %H:%M %z')",
        json!("2021-03-04T10:00:00+02:00"),
    );
    assert!(matches!(
        check_err("parseTime('nope', '%Y')"),
        EvalError::Function { .. }
    ));
    assert!(matches!(
        check_err("parseISOTime('yesterday')"),
        EvalError::Function { .. }
    ));
}

#[test]
fn test_time_arithmetic() {
    check("unix('1970-01-01T00:01:00Z')", json!(60));
    check("fromUnix(86400)", json!("1970-01-02T00:00:00Z"));
    check(
        "addSeconds('2020-01-01T00:00:00Z', -1)",
        json!("2019-12-31T23:59:59Z"),
    );
    check(
        "parseISOTime('2020-01-01T00:01:00Z') - parseISOTime('2020-01-01T00:00:00Z')",
        json!(60),
    );
    check(
        "earliest('2020-01-02T00:00:00Z', '2020-01-01T00:00:00Z')",
        json!("2020-01-01T00:00:00Z"),
    );
    check(
        "latest('2020-01-02T00:00:00Z', '2020-01-01T00:00:00Z')",
        json!("2020-01-02T00:00:00Z"),
    );
    check("isLeapYear('2024-06-01T00:00:00Z')", json!(true));
    check("isLeapYear('2023-06-01T00:00:00Z')", json!(false));
    // 2024-06-01 is a Saturday.
    check("isWeekDay('2024-06-01T00:00:00Z')", json!(false));
    check("isWeekDay('2024-06-03T00:00:00Z')", json!(true));
    check(
        "parseISOTime('2020-01-01T00:00:00Z') < parseISOTime('2020-01-02T00:00:00Z')",
        json!(true),
    );
}

// ----------------------------------------------------------------- Array

#[test]
fn test_array_access() {
    let data = json!({"xs": [3, 1, 2]});
    check_with("push(xs, 4, 5)", json!([3, 1, 2, 4, 5]), data.clone());
    check_with("xs", json!([3, 1, 2]), data.clone());
    check_with("pop(xs)", json!(2), data.clone());
    check_with("shift(xs)", json!(3), data.clone());
    check("pop([])", json!(null));
    check_with("count(xs)", json!(3), data.clone());
    check("count([1, 2, 1, 3], 1, 3)", json!(3));
    check_with("has(xs, 9, 1)", json!(true), data.clone());
    check_with("hasAll(xs, 1, 9)", json!(false), data.clone());
    check_with("find(xs, 2)", json!(2), data.clone());
    check_with("find(xs, 9)", json!(-1), data);
}

#[test]
fn test_array_transforms() {
    check("sort([3, 1, 2])", json!([1, 2, 3]));
    check("sort(['b', 'a'], true)", json!(["b", "a"]));
    check("sort([2, 'a', null, 1])", json!([null, 1, 2, "a"]));
    check("slice([1, 2, 3, 4], 1, 3)", json!([2, 3]));
    check("slice([1, 2, 3, 4], -2)", json!([3, 4]));
    check("slice([1, 2, 3, 4], 3, 1)", json!([]));
    check("flatten([1, [2, [3]], []])", json!([1, 2, [3]]));
    check("unique([1, 2, 1, 'a', 'a'])", json!([1, 2, "a"]));
}

// ----------------------------------------------------------------- KV

#[test]
fn test_kv() {
    let data = json!({"m": {"a": 1, "b": 2}});
    check_with("set(m, 'c', 3)", json!({"a": 1, "b": 2, "c": 3}), data.clone());
    check_with("merge(m, {b: 20})", json!({"a": 1, "b": 20}), data.clone());
    check_with("keys(m)", json!(["a", "b"]), data.clone());
    check_with("values(m)", json!([1, 2]), data.clone());
    check_with("omit(m, 'a')", json!({"b": 2}), data.clone());
    check_with("pick(m, ['a', 'z'])", json!({"a": 1}), data.clone());
    check_with("get(m, 'a')", json!(1), data.clone());
    check_with("get(m, 'z')", json!(null), data.clone());
    check_with("get(m, 'z', 0)", json!(0), data.clone());
    check_with("hasKey(m, 'b')", json!(true), data.clone());
    check_with("m + {c: 3}", json!({"a": 1, "b": 2, "c": 3}), data);
    assert!(matches!(check_err("keys([1])"), EvalError::TypeMismatch { .. }));
}

// ----------------------------------------------------------------- Arity

#[test]
fn test_arity_is_checked_at_parse_time() {
    let parser = Parser::default();
    for source in ["trim()", "substring('a')", "set({}, 'a')", "pop([], 1)"] {
        assert!(
            matches!(parser.parse(source), Err(SyntaxError::Arity { .. })),
            "expected arity error for {}",
            source
        );
    }
}
