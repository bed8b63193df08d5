//! Memoized queries observed from many threads at once

use std::sync::Arc;

use muban::{
    Compilation, DiagnosticKind, MemberModifiers, MethodDeclaration, MethodSignature, SpecialType,
    TypeDeclaration, TypeOrConstant, TypeWithAnnotations,
};
use rayon::prelude::*;

#[test]
fn test_bounds_resolved_once_across_threads() {
    let c = Compilation::new();
    let pair = c
        .declare_type(TypeDeclaration::class("Pair").with_template_parameters(["T", "U"]))
        .unwrap();
    let params = c.template_parameters(pair);
    let (t, u) = (params[0], params[1]);
    c.set_constraints(t, vec![TypeWithAnnotations::new(u)], Vec::new())
        .unwrap();
    c.set_constraints(u, vec![TypeWithAnnotations::new(t)], Vec::new())
        .unwrap();

    let results: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| (c.template_parameter_bounds(t), c.template_parameter_bounds(u)))
        .collect();

    let (t_bounds, u_bounds) = &results[0];
    assert!(t_bounds.is_some());
    assert!(u_bounds.is_none());
    for (t_other, u_other) in &results {
        assert_eq!(t_other, t_bounds);
        assert_eq!(u_other, u_bounds);
    }
    let circular = c
        .declaration_diagnostics()
        .into_iter()
        .filter(|d| d.kind == DiagnosticKind::CircularConstraint)
        .count();
    assert_eq!(circular, 1);
}

#[test]
fn test_override_resolution_shared_across_threads() {
    let c = Compilation::new();
    let void = c.get_special_type(SpecialType::Void);
    let base = c.declare_type(TypeDeclaration::class("Base")).unwrap();
    let child = c.declare_type(TypeDeclaration::class("Child")).unwrap();
    c.set_base_type(child, base).unwrap();
    let base_run = c
        .declare_method(
            base,
            MethodDeclaration::new("Run").with_modifiers(MemberModifiers::VIRTUAL),
        )
        .unwrap();
    let child_run = c
        .declare_method(
            child,
            MethodDeclaration::new("Run").with_modifiers(MemberModifiers::OVERRIDE),
        )
        .unwrap();
    for m in [base_run, child_run] {
        c.set_method_signature(m, MethodSignature::new(void, Vec::new()))
            .unwrap();
    }

    let results: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| c.overridden_or_hidden_members(child_run.into()))
        .collect();

    assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
    assert_eq!(c.overridden_method(child_run), Some(base_run));
}

#[test]
fn test_constructed_members_shared_across_threads() {
    let c = Compilation::new();
    let list = c
        .declare_type(TypeDeclaration::class("List").with_template_parameters(["T"]))
        .unwrap();
    let t = c.template_parameters(list)[0];
    for name in ["Add", "Remove", "Contains"] {
        let m = c.declare_method(list, MethodDeclaration::new(name)).unwrap();
        c.set_method_signature(
            m,
            MethodSignature::new(
                c.get_special_type(SpecialType::Boolean),
                vec![muban::Parameter::new("item", t)],
            ),
        )
        .unwrap();
    }
    let int = c.get_special_type(SpecialType::Int32);
    let list_int = c.construct(list, vec![TypeOrConstant::from(int)]).unwrap();

    let views: Vec<_> = (0..32).into_par_iter().map(|_| c.members(list_int)).collect();
    assert!(views.iter().all(|v| *v == views[0]));
    assert_eq!(views[0].len(), 3);
    for member in &views[0] {
        let method = member.as_method().unwrap();
        assert_eq!(
            c.method_signature(method).parameters[0].ty,
            TypeWithAnnotations::new(int)
        );
    }
}
