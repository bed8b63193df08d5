//! 约束解析与成员关系测试


use crate::frontend::core::type_system::*;
use crate::util::diagnostic::{Diagnostic, DiagnosticArgument, DiagnosticKind};

fn class(
    c: &Compilation,
    name: &str,
    params: &[&str],
) -> NamedTypeId {
    c.declare_type(TypeDeclaration::class(name).with_template_parameters(params.iter().copied()))
        .unwrap()
}

/// `base` 的派生类 `name`
fn derived(
    c: &Compilation,
    name: &str,
    base: NamedTypeId,
) -> NamedTypeId {
    let ty = class(c, name, &[]);
    c.set_base_type(ty, base).unwrap();
    ty
}

/// 声明方法并设置签名
fn method(
    c: &Compilation,
    owner: NamedTypeId,
    declaration: MethodDeclaration,
    return_type: impl Into<TypeWithAnnotations>,
    parameters: Vec<Parameter>,
) -> MethodId {
    let m = c.declare_method(owner, declaration).unwrap();
    c.set_method_signature(m, MethodSignature::new(return_type, parameters))
        .unwrap();
    m
}

fn constrain(
    c: &Compilation,
    parameter: TemplateParamId,
    types: &[TypeSymbol],
) {
    c.set_constraints(
        parameter,
        types.iter().map(|t| TypeWithAnnotations::new(*t)).collect(),
        Vec::new(),
    )
    .unwrap();
}

fn diagnostics_of_kind(
    c: &Compilation,
    kind: DiagnosticKind,
) -> Vec<Diagnostic> {
    c.declaration_diagnostics()
        .into_iter()
        .filter(|d| d.kind == kind)
        .collect()
}

fn int32(c: &Compilation) -> NamedTypeId {
    c.get_special_type(SpecialType::Int32)
}

fn string(c: &Compilation) -> NamedTypeId {
    c.get_special_type(SpecialType::String)
}

fn void(c: &Compilation) -> NamedTypeId {
    c.get_special_type(SpecialType::Void)
}
