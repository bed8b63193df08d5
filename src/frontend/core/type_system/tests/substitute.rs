//! 模板替换测试

use super::*;

/// 测试不涉及映射参数的替换返回同一个 id
#[test]
fn test_noop_substitution_keeps_identity() {
    let c = Compilation::new();
    let list = class(&c, "List", &["T"]);
    let other = class(&c, "Other", &["U"]);
    let map = TemplateMap::new(&c.template_parameters(other), &[int32(&c).into()]);

    let list_string = c.construct(list, vec![string(&c).into()]).unwrap();
    assert_eq!(map.substitute_named_type(&c, list_string), list_string);
    assert_eq!(map.substitute_named_type(&c, string(&c)), string(&c));
    assert_eq!(TemplateMap::empty().substitute_named_type(&c, list), list);

    let ints = c.sz_array_type(int32(&c));
    assert_eq!(map.substitute_array_type(&c, ints), ints);
}

/// 测试替换定义自身得到构造类型
#[test]
fn test_substituting_definition_constructs_it() {
    let c = Compilation::new();
    let list = class(&c, "List", &["T"]);
    let map = TemplateMap::new(&c.template_parameters(list), &[int32(&c).into()]);

    let substituted = map.substitute_named_type(&c, list);
    let constructed = c.construct(list, vec![int32(&c).into()]).unwrap();
    assert_ne!(substituted, list);
    assert!(c.named_types_equal(substituted, constructed, TypeCompareKind::CONSIDER_EVERYTHING));
}

/// 测试数组元素被替换时重建数组并保留维度
#[test]
fn test_array_rebuilt_with_same_shape() {
    let c = Compilation::new();
    let list = class(&c, "List", &["T"]);
    let t = c.template_parameters(list)[0];
    let matrix = c.array_type(t, 2);
    let map = TemplateMap::new(&[t], &[int32(&c).into()]);

    let rebuilt = map.substitute_array_type(&c, matrix);
    assert_ne!(rebuilt, matrix);
    assert_eq!(c.array_rank(rebuilt), 2);
    assert!(!c.is_sz_array(rebuilt));
    assert_eq!(c.array_element_type(rebuilt), TypeWithAnnotations::new(int32(&c)));
    assert_eq!(c.type_name(rebuilt.into()), "Int32[,]");
}

/// 测试结果的可空标记是两侧标记的并
#[test]
fn test_nullability_is_merged() {
    let c = Compilation::new();
    let list = class(&c, "List", &["T"]);
    let t = c.template_parameters(list)[0];

    let to_nullable = TemplateMap::new(&[t], &[TypeWithAnnotations::nullable(string(&c)).into()]);
    assert_eq!(
        to_nullable.substitute_type(&c, TypeWithAnnotations::new(t)),
        TypeOrConstant::Type(TypeWithAnnotations::nullable(string(&c)))
    );

    let to_plain = TemplateMap::new(&[t], &[string(&c).into()]);
    assert_eq!(
        to_plain.substitute_type(&c, TypeWithAnnotations::nullable(t)),
        TypeOrConstant::Type(TypeWithAnnotations::nullable(string(&c)))
    );
    assert_eq!(
        to_plain.substitute_type(&c, TypeWithAnnotations::new(t)),
        TypeOrConstant::Type(TypeWithAnnotations::new(string(&c)))
    );
}

/// 测试不在映射中的参数原样保留
#[test]
fn test_unmapped_parameters_survive() {
    let c = Compilation::new();
    let pair = class(&c, "Pair", &["K", "V"]);
    let params = c.template_parameters(pair);
    let map = TemplateMap::new(&params[..1], &[int32(&c).into()]);

    assert_eq!(
        map.substitute_type(&c, TypeWithAnnotations::new(params[1])),
        TypeOrConstant::from(params[1])
    );
    let partial = map.substitute_named_type(&c, pair);
    assert_eq!(
        c.template_arguments(partial),
        vec![TypeOrConstant::from(int32(&c)), TypeOrConstant::from(params[1])]
    );
}

/// 测试约束类型替换后按忽略可空的相等去重
#[test]
fn test_constraint_types_deduplicated() {
    let c = Compilation::new();
    let pair = class(&c, "Pair", &["K", "V"]);
    let params = c.template_parameters(pair);
    let map = TemplateMap::new(&params, &[string(&c).into(), string(&c).into()]);

    let merged = map.substitute_constraint_types(
        &c,
        &[TypeWithAnnotations::nullable(params[0]), TypeWithAnnotations::new(params[1])],
    );
    assert_eq!(merged, vec![TypeWithAnnotations::new(string(&c))]);

    let all_nullable = map.substitute_constraint_types(
        &c,
        &[
            TypeWithAnnotations::nullable(params[0]),
            TypeWithAnnotations::new(int32(&c)),
            TypeWithAnnotations::nullable(params[1]),
        ],
    );
    assert_eq!(
        all_nullable,
        vec![
            TypeWithAnnotations::nullable(string(&c)),
            TypeWithAnnotations::new(int32(&c)),
        ]
    );
}

/// 测试常量实参出现在类型位置时得到错误类型
#[test]
fn test_constant_in_type_position() {
    let c = Compilation::new();
    let buffer = c
        .declare_type(TypeDeclaration::structure("Buffer").with_template_parameters([
            TemplateParameterDeclaration::new("N").constant(),
        ]))
        .unwrap();
    let n = c.template_parameters(buffer)[0];
    let map = TemplateMap::new(&[n], &[ConstantValue::Int(3).into()]);

    assert_eq!(
        map.substitute_type(&c, TypeWithAnnotations::new(n)),
        TypeOrConstant::Constant(ConstantValue::Int(3))
    );
    let strict = map.substitute_type_strict(&c, TypeWithAnnotations::new(n));
    assert!(c.is_error_type(strict.ty));
}

/// 测试方法签名的替换保留参数名与传递方式
#[test]
fn test_substitute_signature() {
    let c = Compilation::new();
    let list = class(&c, "List", &["T"]);
    let t = c.template_parameters(list)[0];
    let signature = MethodSignature::new(
        t,
        vec![
            Parameter::new("item", t).with_ref_kind(RefKind::Ref),
            Parameter::new("count", int32(&c)),
        ],
    );
    let map = TemplateMap::new(&[t], &[string(&c).into()]);

    let substituted = map.substitute_signature(&c, &signature);
    assert_eq!(substituted.return_type, TypeWithAnnotations::new(string(&c)));
    assert_eq!(substituted.parameters[0].name, "item");
    assert_eq!(substituted.parameters[0].ref_kind, RefKind::Ref);
    assert_eq!(substituted.parameters[0].ty, TypeWithAnnotations::new(string(&c)));
    assert_eq!(substituted.parameters[1].ty, TypeWithAnnotations::new(int32(&c)));
}

/// 测试重命名产生同序号的新参数并追加绑定
#[test]
fn test_alpha_rename() {
    let c = Compilation::new();
    let host = class(&c, "Host", &[]);
    let map_method = c
        .declare_method(host, MethodDeclaration::new("Map").with_template_parameters(["A", "B"]))
        .unwrap();
    let target = c.declare_method(host, MethodDeclaration::new("Target")).unwrap();
    let old_params = c.method_template_parameters(map_method);

    let (renamed_map, new_params) =
        TemplateMap::empty().with_alpha_rename(&c, &old_params, TemplateOwner::Method(target));

    assert_eq!(new_params.len(), 2);
    for (old, new) in old_params.iter().zip(&new_params) {
        assert_ne!(old, new);
        assert_eq!(c.template_parameter_ordinal(*new), c.template_parameter_ordinal(*old));
        assert_eq!(c.template_parameter_name(*new), c.template_parameter_name(*old));
        assert_eq!(c.template_parameter_owner(*new), TemplateOwner::Method(target));
        assert_eq!(c.template_parameter_original(*new), *old);
        assert_eq!(renamed_map.get(*old), Some(&TypeOrConstant::from(*new)));
    }

    let (unchanged, none) = renamed_map.with_alpha_rename(&c, &[], TemplateOwner::Method(target));
    assert!(none.is_empty());
    assert_eq!(unchanged, renamed_map);
}
