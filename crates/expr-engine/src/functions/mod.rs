//! Built-in function libraries, one module per category.

mod array;
mod generic;
mod json;
mod kv;
mod numeric;
mod string;
mod time;

use crate::language::FunctionLibrary;

/// Every built-in library in composition order. Later libraries win on name
/// collisions.
pub fn all() -> Vec<FunctionLibrary> {
    vec![
        generic(),
        string(),
        json(),
        numeric(),
        time(),
        array(),
        kv(),
    ]
}

/// `len`, `isEmpty`, `isNil`, `coalesce`, `typeOf`, `default`.
pub fn generic() -> FunctionLibrary {
    generic::library()
}

/// Text manipulation, regex matching and base64.
pub fn string() -> FunctionLibrary {
    string::library()
}

/// `toJSON` and `parseJSON`.
pub fn json() -> FunctionLibrary {
    json::library()
}

pub fn numeric() -> FunctionLibrary {
    numeric::library()
}

/// Timestamp parsing, formatting and arithmetic. Nothing here reads the clock.
pub fn time() -> FunctionLibrary {
    time::library()
}

pub fn array() -> FunctionLibrary {
    array::library()
}

/// Operations on maps.
pub fn kv() -> FunctionLibrary {
    kv::library()
}
