use super::*;
use crate::functions::BUILTIN_FUNCTIONS;
use pretty_assertions::assert_eq;

fn always_one(_: &[Value]) -> FnResult {
    Ok(Value::Int(1))
}

#[test]
fn test_arity_accepts() {
    assert!(Arity::Exact(2).accepts(2));
    assert!(!Arity::Exact(2).accepts(3));
    assert!(Arity::AtLeast(1).accepts(9));
    assert!(!Arity::AtLeast(1).accepts(0));
    assert!(Arity::Between(1, 3).accepts(3));
    assert!(!Arity::Between(1, 3).accepts(4));
}

#[test]
fn test_arity_display() {
    assert_eq!(Arity::Exact(1).to_string(), "1 argument");
    assert_eq!(Arity::AtLeast(2).to_string(), "at least 2 arguments");
    assert_eq!(Arity::Between(2, 4).to_string(), "2 to 4 arguments");
}

#[test]
fn test_builtin_names_match_registration() {
    let registry = FunctionRegistry::with_builtins();
    let registered: Vec<&str> = registry.sorted().iter().map(|d| d.name.as_str()).collect();
    let mut expected = BUILTIN_FUNCTIONS.to_vec();
    expected.sort_unstable();
    assert_eq!(registered, expected);
}

#[test]
fn test_builtin_list_is_sorted() {
    let mut sorted = BUILTIN_FUNCTIONS.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, BUILTIN_FUNCTIONS);
}

#[test]
fn test_effect_classification() {
    let registry = FunctionRegistry::with_builtins();
    for name in ["add", "printf", "if", "embed"] {
        assert_eq!(registry.get(name).map(FunctionDescriptor::effect), Some(Effect::Pure));
    }
    for name in ["sendMessage", "addRole", "dbGet", "dbQuery", "getMember"] {
        assert_eq!(
            registry.get(name).map(FunctionDescriptor::effect),
            Some(Effect::Effecting),
            "{name}"
        );
    }
}

#[test]
fn test_write_back_functions() {
    let registry = FunctionRegistry::with_builtins();
    let write_back: Vec<&str> = registry
        .sorted()
        .into_iter()
        .filter(|d| d.write_back == WriteBack::FirstArgument)
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(write_back, vec!["addField", "setKey"]);
}

#[test]
fn test_register_replaces() {
    let mut registry = FunctionRegistry::with_builtins();
    let before = registry.len();
    let replaced = registry.register(FunctionDescriptor::pure("add", Arity::Exact(0), always_one));
    assert!(replaced.is_some());
    assert_eq!(registry.len(), before);
    assert_eq!(registry.get("add").map(|d| d.arity), Some(Arity::Exact(0)));
}

#[test]
fn test_check_arity() {
    let descriptor = FunctionDescriptor::pure("one", Arity::Exact(1), always_one);
    assert!(descriptor.check_arity(1).is_ok());
    assert_eq!(
        descriptor.check_arity(0).map_err(|e| e.to_string()),
        Err("expected 1 argument, got 0".to_string())
    );
}

#[test]
fn test_shared_registry_derefs() {
    let shared = SharedRegistry::new(FunctionRegistry::with_builtins());
    let clone = shared.clone();
    assert!(clone.contains("joinStr"));
    assert!(!FunctionRegistry::new().contains("joinStr"));
}
