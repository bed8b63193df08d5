//! 构造与成员替换测试

use super::*;

/// 测试实参数量不符时报错而不是截断或补齐
#[test]
fn test_construct_arity_mismatch() {
    let c = Compilation::new();
    let pair = class(&c, "Pair", &["K", "V"]);

    let result = c.construct(pair, vec![int32(&c).into()]);
    assert_eq!(
        result,
        Err(SymbolError::ArityMismatch {
            name: "Pair".to_string(),
            expected: 2,
            found: 1,
        })
    );
    let too_many = c.construct(
        pair,
        vec![int32(&c).into(), int32(&c).into(), int32(&c).into()],
    );
    assert!(matches!(too_many, Err(SymbolError::ArityMismatch { found: 3, .. })));
}

/// 测试构造的前置条件
#[test]
fn test_construct_contract_violations() {
    let c = Compilation::new();
    let plain = class(&c, "Plain", &[]);
    let list = class(&c, "List", &["T"]);
    let list_int = c.construct(list, vec![int32(&c).into()]).unwrap();

    assert!(matches!(
        c.construct(plain, vec![int32(&c).into()]),
        Err(SymbolError::NotGeneric { .. })
    ));
    assert!(matches!(
        c.construct(list_int, vec![int32(&c).into()]),
        Err(SymbolError::NotADefinition { .. })
    ));
    assert!(matches!(
        c.construct(list, vec![TypeOrConstant::Constant(ConstantValue::Int(4))]),
        Err(SymbolError::TemplateArgumentKindMismatch { ordinal: 0, .. })
    ));
}

/// 测试非类型模板参数
#[test]
fn test_construct_with_constant_argument() {
    let c = Compilation::new();
    let buffer = c
        .declare_type(TypeDeclaration::structure("Buffer").with_template_parameters([
            TemplateParameterDeclaration::new("T"),
            TemplateParameterDeclaration::new("N").constant(),
        ]))
        .unwrap();

    let sized = c
        .construct(
            buffer,
            vec![int32(&c).into(), ConstantValue::Int(16).into()],
        )
        .unwrap();
    assert_eq!(
        c.template_arguments(sized)[1],
        TypeOrConstant::Constant(ConstantValue::Int(16))
    );
    assert!(matches!(
        c.construct(buffer, vec![int32(&c).into(), int32(&c).into()]),
        Err(SymbolError::TemplateArgumentKindMismatch { ordinal: 1, .. })
    ));
}

/// 测试用自身参数构造返回原定义
#[test]
fn test_self_instantiation_returns_definition() {
    let c = Compilation::new();
    let pair = class(&c, "Pair", &["K", "V"]);
    let own: Vec<TypeOrConstant> = c
        .template_parameters(pair)
        .into_iter()
        .map(TypeOrConstant::from)
        .collect();

    assert_eq!(c.construct(pair, own.clone()).unwrap(), pair);

    // 可空的自身参数不是恒等实例化
    let mut nullable = own;
    nullable[0] = TypeWithAnnotations::nullable(c.template_parameters(pair)[0]).into();
    assert_ne!(c.construct(pair, nullable).unwrap(), pair);
}

/// 测试构造类型的模板实参、映射和原始定义
#[test]
fn test_constructed_type_shape() {
    let c = Compilation::new();
    let list = class(&c, "List", &["T"]);
    let list_int = c.construct(list, vec![int32(&c).into()]).unwrap();

    assert!(c.is_definition(list));
    assert!(!c.is_definition(list_int));
    assert!(!c.is_unconstructed(list_int));
    assert_eq!(c.original_definition(list_int), list);
    assert_eq!(c.constructed_from(list_int), list);
    assert_eq!(c.arity(list_int), 1);
    assert_eq!(c.template_arguments(list_int), vec![TypeOrConstant::from(int32(&c))]);
    assert!(c.template_substitution(list).is_none());

    let map = c.template_substitution(list_int).unwrap();
    assert_eq!(
        map.get(c.template_parameters(list)[0]),
        Some(&TypeOrConstant::from(int32(&c)))
    );
}

/// 测试构造类型的基类型经映射替换
#[test]
fn test_constructed_base_type() {
    let c = Compilation::new();
    let base = class(&c, "Base", &["T"]);
    let derived = class(&c, "Derived", &["U"]);
    let base_of_u = c.construct(base, vec![param_type(&c, derived, 0).into()]).unwrap();
    c.set_base_type(derived, base_of_u).unwrap();

    let derived_int = c.construct(derived, vec![int32(&c).into()]).unwrap();
    let base_int = c.construct(base, vec![int32(&c).into()]).unwrap();

    let substituted_base = c.base_type(derived_int).unwrap();
    assert!(c.named_types_equal(substituted_base, base_int, TypeCompareKind::DEFAULT));
    assert_eq!(c.base_type(derived_int), Some(substituted_base));
    assert!(c.inherits_from(derived_int, base_int));
}

/// 测试构造类型的成员经映射替换并被缓存
#[test]
fn test_constructed_members() {
    let c = Compilation::new();
    let list = class(&c, "List", &["T"]);
    let t = param_type(&c, list, 0);
    let item = c
        .declare_field(list, ValueMemberDeclaration::new("item", t))
        .unwrap();
    let get = c.declare_method(list, MethodDeclaration::new("Get")).unwrap();
    c.set_method_signature(
        get,
        MethodSignature::new(t, vec![Parameter::new("index", int32(&c))]),
    )
    .unwrap();
    c.declare_property(list, ValueMemberDeclaration::new("Count", int32(&c)))
        .unwrap();

    let list_string = c.construct(list, vec![string(&c).into()]).unwrap();
    let members = c.members(list_string);
    assert_eq!(members.len(), 3);
    assert_eq!(c.members(list_string), members);

    let field = c.members_named(list_string, "item")[0];
    assert_eq!(
        c.value_member_type(field),
        Some(TypeWithAnnotations::new(string(&c)))
    );
    assert_eq!(c.member_original_definition(field), SymbolId::Field(item));
    assert_eq!(c.member_containing_type(field), Some(list_string));

    let method = c.members_named(list_string, "Get")[0].as_method().unwrap();
    assert_eq!(c.return_type(method), TypeWithAnnotations::new(string(&c)));
    assert_eq!(c.method_original_definition(method), get);
    assert_eq!(
        c.method_signature(method).parameters[0].ty,
        TypeWithAnnotations::new(int32(&c))
    );
}

/// 测试定义容器上的 as_member 原样返回
#[test]
fn test_as_member_on_definition_is_identity() {
    let c = Compilation::new();
    let list = class(&c, "List", &["T"]);
    let get = c.declare_method(list, MethodDeclaration::new("Get")).unwrap();

    assert_eq!(c.as_member(get.into(), list), SymbolId::Method(get));
}

/// 测试已实例化容器中的嵌套泛型类型
#[test]
fn test_nested_generic_type_in_constructed_container() {
    let c = Compilation::new();
    let outer = class(&c, "Outer", &["T"]);
    let inner = c
        .declare_type(
            TypeDeclaration::class("Inner")
                .nested_in(outer)
                .with_template_parameters(["U"]),
        )
        .unwrap();
    c.declare_field(inner, ValueMemberDeclaration::new("outer", param_type(&c, outer, 0)))
        .unwrap();
    c.declare_field(inner, ValueMemberDeclaration::new("inner", param_type(&c, inner, 0)))
        .unwrap();

    let outer_int = c.construct(outer, vec![int32(&c).into()]).unwrap();
    let inner_sub = c.get_type_member(outer_int, "Inner", 1).unwrap();
    assert!(c.is_unconstructed(inner_sub));
    assert!(!c.is_definition(inner_sub));
    assert_eq!(c.original_definition(inner_sub), inner);
    assert_eq!(c.containing_type(inner_sub), Some(outer_int));

    // 嵌套类型的参数被重命名
    let renamed = c.template_parameters(inner_sub)[0];
    assert_ne!(renamed, c.template_parameters(inner)[0]);
    assert_eq!(c.template_parameter_original(renamed), c.template_parameters(inner)[0]);

    let inner_constructed = c
        .construct(inner_sub, vec![string(&c).into()])
        .unwrap();
    let field_type = |name: &str| {
        let field = c.members_named(inner_constructed, name)[0];
        c.value_member_type(field).unwrap()
    };
    assert_eq!(field_type("outer"), TypeWithAnnotations::new(int32(&c)));
    assert_eq!(field_type("inner"), TypeWithAnnotations::new(string(&c)));
}

/// 测试泛型方法的构造
#[test]
fn test_construct_method() {
    let c = Compilation::new();
    let util = class(&c, "Util", &[]);
    let identity = c
        .declare_method(
            util,
            MethodDeclaration::new("Identity")
                .with_template_parameters(["T"])
                .with_modifiers(MemberModifiers::STATIC),
        )
        .unwrap();
    let t = TypeWithAnnotations::new(c.method_template_parameters(identity)[0]);
    c.set_method_signature(identity, MethodSignature::new(t, vec![Parameter::new("value", t)]))
        .unwrap();

    let on_int = c.construct_method(identity, vec![int32(&c).into()]).unwrap();
    assert_eq!(c.return_type(on_int), TypeWithAnnotations::new(int32(&c)));
    assert_eq!(c.method_constructed_from(on_int), identity);
    assert_eq!(c.method_template_arguments(on_int), vec![TypeOrConstant::from(int32(&c))]);
    assert_eq!(c.construct_method(identity, vec![t.into()]).unwrap(), identity);
    assert!(matches!(
        c.construct_method(on_int, vec![int32(&c).into()]),
        Err(SymbolError::NotADefinition { .. })
    ));
}

/// 测试相同实参的重复构造返回同一个实例
#[test]
fn test_construct_reuses_instances() {
    let c = Compilation::new();
    let list = class(&c, "List", &["T"]);
    let util = class(&c, "Util", &[]);
    let identity = c
        .declare_method(util, MethodDeclaration::new("Identity").with_template_parameters(["T"]))
        .unwrap();

    let first = c.construct(list, vec![int32(&c).into()]).unwrap();
    let types_before = c.arena.read().types.len();
    assert_eq!(c.construct(list, vec![int32(&c).into()]).unwrap(), first);
    assert_eq!(c.arena.read().types.len(), types_before);

    // 可空标记不同的实参是不同的实例
    let nullable = c
        .construct(list, vec![TypeWithAnnotations::nullable(int32(&c)).into()])
        .unwrap();
    assert_ne!(nullable, first);

    let on_int = c.construct_method(identity, vec![int32(&c).into()]).unwrap();
    assert_eq!(c.construct_method(identity, vec![int32(&c).into()]).unwrap(), on_int);
    assert_eq!(c.nullable_of(int32(&c)), c.nullable_of(int32(&c)));
}

/// 测试 Nullable<T> 的构造
#[test]
fn test_nullable_of() {
    let c = Compilation::new();
    let nullable_int = c.nullable_of(int32(&c));

    assert_eq!(c.special_type(nullable_int.into()), SpecialType::Nullable);
    assert_eq!(
        c.nullable_underlying_type(nullable_int.into()),
        Some(TypeWithAnnotations::new(int32(&c)))
    );
    assert_eq!(c.nullable_underlying_type(int32(&c).into()), None);
    assert_eq!(
        c.base_type(nullable_int),
        Some(c.get_special_type(SpecialType::ValueType))
    );
}
