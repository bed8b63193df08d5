//! 成员签名比较
//!
//! 泛型方法比较前先把各自的模板参数替换为按序号编号的规范参数，
//! 因此 `M<T>(T)` 与 `M<U>(U)` 签名相同。

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::frontend::core::type_system::compilation::{memoize, MethodVariant};
use crate::frontend::core::type_system::{
    Compilation, MethodId, MethodSignature, Parameter, RefKind, SpecialType, SymbolId, TemplateMap,
    TemplateParamId, TypeCompareKind, TypeOrConstant, TypeSymbol, TypeWithAnnotations,
};

/// 签名比较策略
///
/// 无状态的配置记录，决定哪些部分参与相等判断。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberSignatureComparer {
    pub consider_name: bool,
    pub consider_arity: bool,
    pub consider_return_type: bool,
    /// 为 false 时只区分按值与按引用传递
    pub consider_ref_kind: bool,
    pub consider_template_constraints: bool,
    pub type_compare_kind: TypeCompareKind,
}

/// 规范化后的签名
struct CanonicalSignature {
    return_type: Option<TypeWithAnnotations>,
    parameters: Vec<Parameter>,
}

impl MemberSignatureComparer {
    /// 同一程序集内的重写匹配：不比较返回类型
    pub const OVERRIDE: MemberSignatureComparer = MemberSignatureComparer {
        consider_name: true,
        consider_arity: true,
        consider_return_type: false,
        consider_ref_kind: true,
        consider_template_constraints: false,
        type_compare_kind: TypeCompareKind::IGNORE_NULLABILITY,
    };

    /// 跨程序集的重写匹配：返回类型也必须相同
    pub const OVERRIDE_WITH_RETURN: MemberSignatureComparer = MemberSignatureComparer {
        consider_return_type: true,
        ..Self::OVERRIDE
    };

    /// 隐藏匹配：比较返回类型，不区分 ref/out/in
    pub const HIDE: MemberSignatureComparer = MemberSignatureComparer {
        consider_return_type: true,
        consider_ref_kind: false,
        ..Self::OVERRIDE
    };

    /// 两个成员的签名是否相等
    pub fn equals(
        &self,
        c: &Compilation,
        a: SymbolId,
        b: SymbolId,
    ) -> bool {
        if a == b {
            return true;
        }
        if a.kind() != b.kind() {
            return false;
        }
        if self.consider_name && c.member_name(a) != c.member_name(b) {
            return false;
        }
        if self.consider_arity && c.member_arity(a) != c.member_arity(b) {
            return false;
        }
        let (Some(x), Some(y)) = (canonical_signature(c, a), canonical_signature(c, b)) else {
            // 嵌套类型只比较名称与元数
            return true;
        };
        if x.parameters.len() != y.parameters.len() {
            return false;
        }
        if self.consider_return_type {
            match (x.return_type, y.return_type) {
                (Some(rx), Some(ry)) => {
                    if !c.type_with_annotations_equal(rx, ry, self.type_compare_kind) {
                        return false;
                    }
                }
                (None, None) => {}
                _ => return false,
            }
        }
        let parameters_match = x.parameters.iter().zip(&y.parameters).all(|(p, q)| {
            c.type_with_annotations_equal(p.ty, q.ty, self.type_compare_kind)
                && self.ref_kinds_match(p.ref_kind, q.ref_kind)
        });
        if !parameters_match {
            return false;
        }
        if self.consider_template_constraints {
            if let (Some(ma), Some(mb)) = (a.as_method(), b.as_method()) {
                return self.constraints_match(c, ma, mb);
            }
        }
        true
    }

    fn ref_kinds_match(
        &self,
        a: RefKind,
        b: RefKind,
    ) -> bool {
        if self.consider_ref_kind {
            a == b
        } else {
            (a == RefKind::None) == (b == RefKind::None)
        }
    }

    /// 约束标志必须一致，约束类型集合互为子集
    ///
    /// Object 不参与比较；有 primitive 标志时 ValueType 也不参与。
    fn constraints_match(
        &self,
        c: &Compilation,
        a: MethodId,
        b: MethodId,
    ) -> bool {
        let (params_a, params_b) = (
            c.method_template_parameters(a),
            c.method_template_parameters(b),
        );
        let (map_a, map_b) = (canonical_map(c, &params_a), canonical_map(c, &params_b));
        params_a.iter().zip(&params_b).all(|(pa, pb)| {
            if c.has_primitive_type_constraint(*pa) != c.has_primitive_type_constraint(*pb)
                || c.has_object_type_constraint(*pa) != c.has_object_type_constraint(*pb)
            {
                return false;
            }
            let set_a = significant_constraints(c, *pa, &map_a);
            let set_b = significant_constraints(c, *pb, &map_b);
            is_subset(c, &set_a, &set_b, self.type_compare_kind)
                && is_subset(c, &set_b, &set_a, self.type_compare_kind)
        })
    }

    /// 与 [`equals`](Self::equals) 一致的哈希
    pub fn signature_hash(
        &self,
        c: &Compilation,
        member: SymbolId,
    ) -> u64 {
        let mut hasher = DefaultHasher::new();
        member.kind().hash(&mut hasher);
        if self.consider_name {
            c.member_name(member).hash(&mut hasher);
        }
        if self.consider_arity {
            c.member_arity(member).hash(&mut hasher);
        }
        if let Some(signature) = canonical_signature(c, member) {
            signature.parameters.len().hash(&mut hasher);
            if self.consider_return_type {
                if let Some(return_type) = signature.return_type {
                    c.hash_type_into(return_type.ty, &mut hasher);
                }
            }
            for parameter in &signature.parameters {
                c.hash_type_into(parameter.ty.ty, &mut hasher);
                (parameter.ref_kind == RefKind::None).hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

/// 方法自身模板参数 -> 规范参数
fn canonical_map(
    c: &Compilation,
    params: &[TemplateParamId],
) -> TemplateMap {
    let indexed: Vec<TypeOrConstant> = (0..params.len())
        .map(|ordinal| TypeOrConstant::from(c.indexed_template_parameter(ordinal)))
        .collect();
    TemplateMap::new(params, &indexed)
}

/// 方法的规范签名
///
/// 结果缓存在方法上；尚未设置签名的源方法每次重新计算。
fn canonical_method_signature(
    c: &Compilation,
    method: MethodId,
) -> Arc<MethodSignature> {
    let compute = || {
        let map = canonical_map(c, &c.method_template_parameters(method));
        Arc::new(map.substitute_signature(c, &c.method_signature(method)))
    };
    let data = c.method(method);
    if matches!(data.variant, MethodVariant::Definition { .. }) && data.signature.get().is_none() {
        return compute();
    }
    memoize(&data.canonical_signature, compute)
}

fn canonical_signature(
    c: &Compilation,
    member: SymbolId,
) -> Option<CanonicalSignature> {
    match member {
        SymbolId::Method(method) => {
            let signature = canonical_method_signature(c, method);
            Some(CanonicalSignature {
                return_type: Some(signature.return_type),
                parameters: signature.parameters.clone(),
            })
        }
        SymbolId::Field(_) | SymbolId::Property(_) => Some(CanonicalSignature {
            return_type: c.value_member_type(member),
            parameters: Vec::new(),
        }),
        SymbolId::NamedType(_) => None,
    }
}

fn significant_constraints(
    c: &Compilation,
    parameter: TemplateParamId,
    map: &TemplateMap,
) -> Vec<TypeSymbol> {
    let primitive = c.has_primitive_type_constraint(parameter);
    c.constraint_types(parameter)
        .into_iter()
        .map(|t| map.substitute_type_strict(c, t).ty)
        .filter(|ty| match c.special_type(*ty) {
            SpecialType::Object => false,
            SpecialType::ValueType => !primitive,
            _ => true,
        })
        .collect()
}

fn is_subset(
    c: &Compilation,
    subset: &[TypeSymbol],
    superset: &[TypeSymbol],
    compare_kind: TypeCompareKind,
) -> bool {
    subset
        .iter()
        .all(|t| superset.iter().any(|u| c.types_equal(*t, *u, compare_kind)))
}
