use kestrel::scope::Scope;
use kestrel::types::{
    MatchOptions, MatchResult, PrimitiveType, TypeAnnotation, TypeSignature, TypeSignatureManager,
};
use kestrel::value::Value;
use proptest::prelude::*;

#[test]
fn test_primitives_are_preregistered() {
    let manager = TypeSignatureManager::new();
    for primitive in PrimitiveType::ALL {
        assert_eq!(
            manager.registry().lookup(primitive.name()),
            Some(primitive.type_id())
        );
    }
}

#[test]
fn test_forward_declared_names_are_stable() {
    let mut manager = TypeSignatureManager::new();
    let first = manager.registry_mut().get_or_declare("Counter");
    let second = manager.registry_mut().get_or_declare("Counter");
    assert_eq!(first, second);
    assert_eq!(manager.registry().name(first), Some("Counter"));
}

#[test]
fn test_structurally_equal_signatures_share_an_id() {
    let mut manager = TypeSignatureManager::new();
    let int = manager.primitive(PrimitiveType::Int);
    let list_of_int = manager.container(PrimitiveType::List.type_id(), vec![int]);
    let again = manager.container(PrimitiveType::List.type_id(), vec![int]);
    assert_eq!(list_of_int, again);
    assert_eq!(manager.display(list_of_int), "List[Int]");
}

#[test]
fn test_union_is_order_independent() {
    let mut manager = TypeSignatureManager::new();
    let int = manager.primitive(PrimitiveType::Int);
    let string = manager.primitive(PrimitiveType::String);
    let bool = manager.primitive(PrimitiveType::Bool);

    let lhs = manager.union(vec![int, string]);
    let rhs = manager.union(vec![string, int, string]);
    assert_eq!(lhs, rhs);

    let nested = manager.union(vec![lhs, bool]);
    let flat = manager.union(vec![bool, string, int]);
    assert_eq!(nested, flat);
}

#[test]
fn test_union_collapses() {
    let mut manager = TypeSignatureManager::new();
    let int = manager.primitive(PrimitiveType::Int);
    let any = manager.any();
    assert_eq!(manager.union(vec![int]), int);
    assert_eq!(manager.union(vec![int, int]), int);
    assert_eq!(manager.union(vec![int, any]), any);
    assert_eq!(manager.get(any), Some(&TypeSignature::Any));
}

#[test]
fn test_numeric_widening() {
    let mut manager = TypeSignatureManager::new();
    let options = MatchOptions::default();
    let double = manager.primitive(PrimitiveType::Double);
    let int = manager.primitive(PrimitiveType::Int);

    let widened = manager.match_value(double, &Value::int(1), &options);
    assert_eq!(widened, MatchResult::accept(MatchResult::SCORE_WIDENED, 3));

    let exact = manager.match_value(double, &Value::double(1.0), &options);
    assert_eq!(exact, MatchResult::accept(MatchResult::SCORE_EXACT, 0));

    assert!(!manager.match_value(int, &Value::double(1.0), &options).ok);

    let strict = MatchOptions {
        allow_numeric_widening: false,
        ..options
    };
    assert!(!manager.match_value(double, &Value::int(1), &strict).ok);
}

#[test]
fn test_any_match_can_be_disabled() {
    let manager = TypeSignatureManager::new();
    let any = manager.any();
    let options = MatchOptions::default();
    assert_eq!(
        manager.match_value(any, &Value::string("x"), &options),
        MatchResult::accept(MatchResult::SCORE_ANY, 0)
    );
    let strict = MatchOptions {
        allow_any: false,
        ..options
    };
    assert!(!manager.match_value(any, &Value::string("x"), &strict).ok);
}

#[test]
fn test_union_picks_best_member() {
    let mut manager = TypeSignatureManager::new();
    let options = MatchOptions::default();
    let long = manager.primitive(PrimitiveType::Long);
    let string = manager.primitive(PrimitiveType::String);
    let union = manager.union(vec![long, string]);
    assert_eq!(
        manager.match_value(union, &Value::int(1), &options),
        MatchResult::accept(MatchResult::SCORE_WIDENED, 1)
    );
    assert!(manager.match_value(union, &Value::string("x"), &options).ok);
    assert!(!manager.match_value(union, &Value::bool(true), &options).ok);
}

#[test]
fn test_annotations_resolve_through_aliases() {
    let scope = Scope::root(MatchOptions::default());
    let union = TypeAnnotation::Union(vec![
        TypeAnnotation::named("Int"),
        TypeAnnotation::named("String"),
    ]);
    let alias = scope.bind_alias("Key", &union);
    assert_eq!(scope.bind_type(Some(&TypeAnnotation::named("Key"))), alias);
    assert_eq!(scope.bind_type(Some(&union)), alias);
    assert_eq!(scope.display_type(alias), "Int | String");
}

#[test]
fn test_bare_container_defaults_to_any_elements() {
    let scope = Scope::root(MatchOptions::default());
    let list = scope.bind_type(Some(&TypeAnnotation::named("List")));
    assert_eq!(scope.display_type(list), "List[Any]");
    let ints = Value::list(vec![Value::int(1)]);
    assert!(scope.match_value(list, &ints).ok);
    assert_eq!(scope.infer_type(&Value::list(Vec::new())), list);
}

#[test]
fn test_invocable_display() {
    let scope = Scope::root(MatchOptions::default());
    let invocable = scope.bind_type(Some(&TypeAnnotation::Invocable {
        parameters: vec![
            TypeAnnotation::named("Int"),
            TypeAnnotation::named("String"),
        ],
        return_type: Box::new(TypeAnnotation::named("Bool")),
        variadic: true,
    }));
    assert_eq!(scope.display_type(invocable), "(Int, ...String) -> Bool");
}

fn primitive() -> impl Strategy<Value = PrimitiveType> {
    proptest::sample::select(PrimitiveType::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_union_interning_ignores_order(members in proptest::collection::vec(primitive(), 1..6)) {
        let mut manager = TypeSignatureManager::new();
        let ids: Vec<_> = members.iter().map(|p| manager.primitive(*p)).collect();
        let mut reversed = ids.clone();
        reversed.reverse();
        let lhs = manager.union(ids);
        let rhs = manager.union(reversed);
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_exact_match_for_inferred_signature(value in any::<i64>()) {
        let mut manager = TypeSignatureManager::new();
        let value = Value::long(value);
        let inferred = manager.infer_from_value(&value);
        let result = manager.match_value(inferred, &value, &MatchOptions::default());
        prop_assert_eq!(result, MatchResult::accept(MatchResult::SCORE_EXACT, 0));
    }
}
