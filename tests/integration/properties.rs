//! End-to-end scenarios through the public API of `muban`

use muban::{
    Compilation, DiagnosticKind, MemberModifiers, MethodDeclaration, MethodSignature, NamedTypeId,
    Parameter, SpecialType, SymbolError, SymbolId, TemplateMap, TemplateParameterDeclaration,
    TypeCompareKind, TypeDeclaration, TypeOrConstant, TypeWithAnnotations, ValueMemberDeclaration,
};

fn generic_class(
    c: &Compilation,
    name: &str,
    params: &[&str],
) -> NamedTypeId {
    c.declare_type(TypeDeclaration::class(name).with_template_parameters(params.iter().copied()))
        .unwrap()
}

#[test]
fn test_noop_substitution_returns_same_symbols() {
    let c = Compilation::new();
    let int = c.get_special_type(SpecialType::Int32);
    let list = generic_class(&c, "List", &["T"]);
    let unrelated = generic_class(&c, "Unrelated", &["U"]);
    let map = TemplateMap::new(
        &c.template_parameters(unrelated),
        &[TypeOrConstant::from(c.get_special_type(SpecialType::String))],
    );

    let ints = c.sz_array_type(int);
    let list_int = c.construct(list, vec![int.into()]).unwrap();
    assert_eq!(map.substitute_array_type(&c, ints), ints);
    assert_eq!(map.substitute_named_type(&c, list_int), list_int);
    assert_eq!(
        map.substitute_type(&c, TypeWithAnnotations::new(list_int)),
        TypeOrConstant::from(list_int)
    );
}

#[test]
fn test_arity_is_enforced() {
    let c = Compilation::new();
    let int = c.get_special_type(SpecialType::Int32);
    let map_type = generic_class(&c, "Map", &["K", "V"]);

    for count in [0usize, 1, 3] {
        let arguments = vec![TypeOrConstant::from(int); count];
        match c.construct(map_type, arguments) {
            Err(SymbolError::ArityMismatch { expected, found, .. }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, count);
            }
            other => panic!("expected an arity mismatch, got {:?}", other),
        }
    }
}

#[test]
fn test_self_instantiation_is_identity() {
    let c = Compilation::new();
    let map_type = generic_class(&c, "Map", &["K", "V"]);
    let own = c
        .template_parameters(map_type)
        .into_iter()
        .map(TypeOrConstant::from)
        .collect();
    assert_eq!(c.construct(map_type, own).unwrap(), map_type);
}

#[test]
fn test_override_determinism() {
    let c = Compilation::new();
    let int = c.get_special_type(SpecialType::Int32);
    let a = c.declare_type(TypeDeclaration::class("A")).unwrap();
    let b = c.declare_type(TypeDeclaration::class("B")).unwrap();
    c.set_base_type(b, a).unwrap();

    let a_m = c
        .declare_method(a, MethodDeclaration::new("M").with_modifiers(MemberModifiers::VIRTUAL))
        .unwrap();
    let b_m = c
        .declare_method(b, MethodDeclaration::new("M").with_modifiers(MemberModifiers::OVERRIDE))
        .unwrap();
    for m in [a_m, b_m] {
        c.set_method_signature(m, MethodSignature::new(int, vec![Parameter::new("x", int)]))
            .unwrap();
    }

    let first = c.overridden_or_hidden_members(b_m.into());
    assert_eq!(first.overridden_members, vec![SymbolId::Method(a_m)]);
    assert!(first.hidden_members.is_empty());
    for _ in 0..3 {
        assert_eq!(c.overridden_or_hidden_members(b_m.into()), first);
    }
}

#[test]
fn test_field_hides_zero_arity_method_only() {
    let c = Compilation::new();
    let int = c.get_special_type(SpecialType::Int32);
    let a = c.declare_type(TypeDeclaration::class("A")).unwrap();
    let b = c.declare_type(TypeDeclaration::class("B")).unwrap();
    c.set_base_type(b, a).unwrap();

    let x = c.declare_method(a, MethodDeclaration::new("X")).unwrap();
    let x_int = c.declare_method(a, MethodDeclaration::new("X")).unwrap();
    c.set_method_signature(x_int, MethodSignature::new(int, vec![Parameter::new("v", int)]))
        .unwrap();
    let field = c
        .declare_field(b, ValueMemberDeclaration::new("X", int))
        .unwrap();

    let result = c.overridden_or_hidden_members(field.into());
    assert_eq!(result.hidden_members, vec![SymbolId::Method(x)]);
    assert!(!result.hidden_members.contains(&SymbolId::Method(x_int)));
}

#[test]
fn test_conflicting_constraints_keep_first() {
    let c = Compilation::new();
    let unrelated = c.declare_type(TypeDeclaration::class("SomeUnrelatedClass")).unwrap();
    let boxed = c
        .declare_type(
            TypeDeclaration::class("Box")
                .with_template_parameters([TemplateParameterDeclaration::new("T").primitive()]),
        )
        .unwrap();
    let t = c.template_parameters(boxed)[0];
    c.set_constraints(t, vec![TypeWithAnnotations::new(unrelated)], Vec::new())
        .unwrap();

    let value_type = c.get_special_type(SpecialType::ValueType);
    assert_eq!(c.deduced_base_type(t), value_type.into());
    let conflicts: Vec<_> = c
        .declaration_diagnostics()
        .into_iter()
        .filter(|d| d.kind == DiagnosticKind::ConflictingBaseConstraint)
        .collect();
    assert_eq!(conflicts.len(), 1);
}

#[test]
fn test_constraint_dedup_merges_nullability() {
    let c = Compilation::new();
    let boxed = generic_class(&c, "Box", &["T"]);
    let t = c.template_parameters(boxed)[0];
    let identity = TemplateMap::new(&[t], &[TypeOrConstant::from(t)]);

    let merged = identity.substitute_constraint_types(
        &c,
        &[TypeWithAnnotations::nullable(t), TypeWithAnnotations::new(t)],
    );
    assert_eq!(merged, vec![TypeWithAnnotations::new(t)]);
}

#[test]
fn test_substitution_through_nested_generics() {
    let c = Compilation::new();
    let int = c.get_special_type(SpecialType::Int32);
    let string = c.get_special_type(SpecialType::String);
    let dictionary = generic_class(&c, "Dictionary", &["K", "V"]);
    let params = c.template_parameters(dictionary);
    let entry = c
        .declare_type(
            TypeDeclaration::class("Entry")
                .nested_in(dictionary)
                .with_template_parameters(["X"]),
        )
        .unwrap();
    let x = c.template_parameters(entry)[0];
    let values = c.sz_array_type(params[1]);
    c.declare_field(entry, ValueMemberDeclaration::new("key", params[0]))
        .unwrap();
    c.declare_field(entry, ValueMemberDeclaration::new("values", values))
        .unwrap();
    c.declare_field(entry, ValueMemberDeclaration::new("extra", x))
        .unwrap();

    let concrete = c
        .construct(dictionary, vec![string.into(), int.into()])
        .unwrap();
    let entry_in_concrete = c.get_type_member(concrete, "Entry", 1).unwrap();
    let entry_double = c
        .construct(
            entry_in_concrete,
            vec![c.get_special_type(SpecialType::Double).into()],
        )
        .unwrap();

    let field_type = |name: &str| {
        let member = c.members_named(entry_double, name)[0];
        c.value_member_type(member).unwrap()
    };
    assert_eq!(field_type("key"), TypeWithAnnotations::new(string));
    let values_type = field_type("values").ty;
    assert!(c.types_equal(
        values_type,
        c.sz_array_type(int).into(),
        TypeCompareKind::CONSIDER_EVERYTHING
    ));
    assert_eq!(
        field_type("extra"),
        TypeWithAnnotations::new(c.get_special_type(SpecialType::Double))
    );
}
