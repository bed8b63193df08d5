//! 符号层测试模块

mod construct;
mod substitute;

use super::*;

/// 声明 `class Name<params...>`
fn class(
    c: &Compilation,
    name: &str,
    params: &[&str],
) -> NamedTypeId {
    c.declare_type(TypeDeclaration::class(name).with_template_parameters(params.iter().copied()))
        .unwrap()
}

/// 第 `ordinal` 个模板参数作为类型
fn param_type(
    c: &Compilation,
    ty: NamedTypeId,
    ordinal: usize,
) -> TypeWithAnnotations {
    TypeWithAnnotations::new(c.template_parameters(ty)[ordinal])
}

fn int32(c: &Compilation) -> NamedTypeId {
    c.get_special_type(SpecialType::Int32)
}

fn string(c: &Compilation) -> NamedTypeId {
    c.get_special_type(SpecialType::String)
}
