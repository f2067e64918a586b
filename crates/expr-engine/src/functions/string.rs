use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::language::FunctionLibrary;
use crate::operators::compile_regex;
use crate::types::Arity;
use crate::util::{array_arg, bool_arg, integer_arg, string_arg, to_integer, to_number};
use crate::value::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt::Write;

/// Largest string, in bytes, that `repeat` will build.
const MAX_REPEAT_BYTES: usize = 16 << 20;

/// Largest `%.Nf` precision `format` accepts; an f64 carries at most 17
/// significant digits.
const MAX_FORMAT_PRECISION: usize = 17;

fn trim_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::from(string_arg("trim", args, 0)?.trim()))
}

fn trim_left_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::from(string_arg("trimLeft", args, 0)?.trim_start()))
}

fn trim_right_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::from(string_arg("trimRight", args, 0)?.trim_end()))
}

fn to_lower_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::from(string_arg("toLower", args, 0)?.to_lowercase()))
}

fn to_upper_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::from(string_arg("toUpper", args, 0)?.to_uppercase()))
}

/// Upper-cases the first letter of every whitespace separated word.
fn title_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("title", args, 0)?;
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    Ok(Value::String(out))
}

fn has_prefix_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("hasPrefix", args, 0)?;
    let prefix = string_arg("hasPrefix", args, 1)?;
    Ok(Value::Bool(s.starts_with(prefix)))
}

fn has_suffix_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("hasSuffix", args, 0)?;
    let suffix = string_arg("hasSuffix", args, 1)?;
    Ok(Value::Bool(s.ends_with(suffix)))
}

/// `hasSubstring(s, sub[, caseSensitive = true])`
fn has_substring_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("hasSubstring", args, 0)?;
    let sub = string_arg("hasSubstring", args, 1)?;
    let case_sensitive = match args.get(2) {
        Some(_) => bool_arg("hasSubstring", args, 2)?,
        None => true,
    };
    let found = if case_sensitive {
        s.contains(sub)
    } else {
        s.to_lowercase().contains(&sub.to_lowercase())
    };
    Ok(Value::Bool(found))
}

/// `substring(s, start[, end])` over characters; `end` is exclusive and clamped.
fn substring_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("substring", args, 0)?;
    let len = s.chars().count() as i64;
    let start = integer_arg("substring", args, 1)?;
    let end = match args.get(2) {
        Some(_) => integer_arg("substring", args, 2)?.min(len),
        None => len,
    };
    if start < 0 || start > len {
        return Err(EvalError::IndexOutOfBounds {
            index: start,
            len: len as usize,
        });
    }
    if end < start {
        return Err(EvalError::function(
            "substring",
            format!("end {} is before start {}", end, start),
        ));
    }
    Ok(Value::String(
        s.chars()
            .skip(start as usize)
            .take((end - start) as usize)
            .collect(),
    ))
}

/// `split(s, sep[, limit])`; a negative limit means no limit.
fn split_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("split", args, 0)?;
    let sep = string_arg("split", args, 1)?;
    let limit = match args.get(2) {
        Some(_) => integer_arg("split", args, 2)?,
        None => -1,
    };
    let parts: Vec<Value> = match (sep.is_empty(), limit) {
        (_, 0) => Vec::new(),
        (true, _) => s.chars().map(|c| Value::String(c.to_string())).collect(),
        (false, n) if n > 0 => s.splitn(n as usize, sep).map(Value::from).collect(),
        (false, _) => s.split(sep).map(Value::from).collect(),
    };
    Ok(Value::Array(parts))
}

fn join_eval(args: &[Value], ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let items = array_arg("join", args, 0)?;
    let sep = match args.get(1) {
        Some(_) => string_arg("join", args, 1)?,
        None => "",
    };
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        ctx.check()?;
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(&item.to_string());
    }
    Ok(Value::String(out))
}

/// `replace(s, old, new[, n])`; `n < 0` replaces every occurrence.
fn replace_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("replace", args, 0)?;
    let from = string_arg("replace", args, 1)?;
    let to = string_arg("replace", args, 2)?;
    let n = match args.get(3) {
        Some(_) => integer_arg("replace", args, 3)?,
        None => -1,
    };
    let out = if n < 0 {
        s.replace(from, to)
    } else {
        s.replacen(from, to, n as usize)
    };
    Ok(Value::String(out))
}

fn repeat_eval(args: &[Value], ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("repeat", args, 0)?;
    let n = integer_arg("repeat", args, 1)?;
    if n < 0 {
        return Err(EvalError::function("repeat", "negative repeat count"));
    }
    let size = usize::try_from(n)
        .ok()
        .and_then(|n| s.len().checked_mul(n))
        .filter(|&size| size <= MAX_REPEAT_BYTES)
        .ok_or_else(|| {
            EvalError::function(
                "repeat",
                format!("result would exceed {} bytes", MAX_REPEAT_BYTES),
            )
        })?;
    ctx.check()?;
    let mut out = String::with_capacity(size);
    for _ in 0..n {
        out.push_str(s);
    }
    Ok(Value::String(out))
}

/// `shorten(s, "char" | "word", count)` truncates and appends an ellipsis
/// when anything was cut.
fn shorten_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("shorten", args, 0)?;
    let mode = string_arg("shorten", args, 1)?;
    let count = integer_arg("shorten", args, 2)?.max(0) as usize;
    let kept: Option<String> = match mode {
        "char" => {
            if s.chars().count() <= count {
                None
            } else {
                Some(s.chars().take(count).collect())
            }
        }
        "word" => {
            let words: Vec<&str> = s.split_whitespace().collect();
            if words.len() <= count {
                None
            } else {
                Some(words[..count].join(" "))
            }
        }
        other => {
            return Err(EvalError::function(
                "shorten",
                format!("unknown mode {:?}, expected \"char\" or \"word\"", other),
            ))
        }
    };
    Ok(Value::String(match kept {
        Some(k) => k + " \u{2026}",
        None => s.to_string(),
    }))
}

fn match_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let s = string_arg("match", args, 0)?;
    let pattern = string_arg("match", args, 1)?;
    Ok(Value::Bool(compile_regex(pattern)?.is_match(s)))
}

fn base64_encode_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(STANDARD.encode(string_arg("base64encode", args, 0)?)))
}

fn base64_decode_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let bytes = STANDARD
        .decode(string_arg("base64decode", args, 0)?)
        .map_err(|e| EvalError::function("base64decode", e.to_string()))?;
    String::from_utf8(bytes)
        .map(Value::String)
        .map_err(|_| EvalError::function("base64decode", "decoded bytes are not valid UTF-8"))
}

/// Printf-style formatting.
///
/// Verbs: `%v` and `%s` (display form), `%d` (integer), `%f` (six decimals),
/// `%.Nf` (N decimals, at most 17), `%%` (literal percent).
fn format_eval(args: &[Value], _ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let template = string_arg("format", args, 0)?;
    let mut values = args[1..].iter();
    let mut next = |verb: char| {
        values
            .next()
            .ok_or_else(|| EvalError::function("format", format!("missing argument for %{}", verb)))
    };
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }
            let n = if digits.is_empty() {
                Some(0)
            } else {
                digits.parse::<usize>().ok()
            };
            let n = n
                .filter(|&n| n <= MAX_FORMAT_PRECISION)
                .ok_or_else(|| EvalError::function("format", "precision out of range"))?;
            precision = Some(n);
        }
        let written = match chars.next() {
            Some('%') => {
                out.push('%');
                Ok(())
            }
            Some(verb @ ('v' | 's')) => write!(out, "{}", next(verb)?),
            Some('d') => write!(out, "{}", to_integer(next('d')?, "format")?),
            Some('f') => {
                let n = to_number(next('f')?, "format")?;
                write!(out, "{:.*}", precision.unwrap_or(6), n)
            }
            Some(other) => {
                return Err(EvalError::function(
                    "format",
                    format!("unknown verb %{}", other),
                ))
            }
            None => return Err(EvalError::function("format", "dangling '%' at end of template")),
        };
        written.map_err(|e| EvalError::function("format", e.to_string()))?;
    }
    Ok(Value::String(out))
}

pub(super) fn library() -> FunctionLibrary {
    FunctionLibrary::new("string")
        .function("trim", Arity::Fixed(1), trim_eval)
        .function("trimLeft", Arity::Fixed(1), trim_left_eval)
        .function("trimRight", Arity::Fixed(1), trim_right_eval)
        .function("toLower", Arity::Fixed(1), to_lower_eval)
        .function("toUpper", Arity::Fixed(1), to_upper_eval)
        .function("title", Arity::Fixed(1), title_eval)
        .function("hasPrefix", Arity::Fixed(2), has_prefix_eval)
        .function("hasSuffix", Arity::Fixed(2), has_suffix_eval)
        .function("hasSubstring", Arity::Range(2, Some(3)), has_substring_eval)
        .function("substring", Arity::Range(2, Some(3)), substring_eval)
        .function("split", Arity::Range(2, Some(3)), split_eval)
        .function("join", Arity::Range(1, Some(2)), join_eval)
        .function("replace", Arity::Range(3, Some(4)), replace_eval)
        .function("repeat", Arity::Fixed(2), repeat_eval)
        .function("shorten", Arity::Fixed(3), shorten_eval)
        .function("match", Arity::Fixed(2), match_eval)
        .function("base64encode", Arity::Fixed(1), base64_encode_eval)
        .function("base64decode", Arity::Fixed(1), base64_decode_eval)
        .function("format", Arity::Range(1, None), format_eval)
}
