//! Property tests over randomly shaped constructed types

use muban::{
    Compilation, NamedTypeId, SpecialType, TemplateMap, TemplateParamId, TypeCompareKind,
    TypeDeclaration, TypeOrConstant, TypeSymbol, TypeWithAnnotations,
};
use proptest::prelude::*;

/// Shape of a type built from a few fixed declarations
#[derive(Debug, Clone, PartialEq, Eq)]
enum Shape {
    Int,
    Str,
    /// The open parameter `T` of the host declaration
    Param,
    List(Box<Shape>),
    Pair(Box<Shape>, Box<Shape>),
    Array(Box<Shape>, usize),
}

impl Shape {
    /// Replace every `Param` leaf with `replacement`
    fn plug(
        &self,
        replacement: &Shape,
    ) -> Shape {
        match self {
            Shape::Param => replacement.clone(),
            Shape::Int | Shape::Str => self.clone(),
            Shape::List(inner) => Shape::List(Box::new(inner.plug(replacement))),
            Shape::Pair(a, b) => {
                Shape::Pair(Box::new(a.plug(replacement)), Box::new(b.plug(replacement)))
            }
            Shape::Array(inner, rank) => Shape::Array(Box::new(inner.plug(replacement)), *rank),
        }
    }
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![Just(Shape::Int), Just(Shape::Str), Just(Shape::Param)];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Shape::List(Box::new(s))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Pair(Box::new(a), Box::new(b))),
            (inner, 1usize..3).prop_map(|(s, rank)| Shape::Array(Box::new(s), rank)),
        ]
    })
}

fn closed_shape_strategy() -> impl Strategy<Value = Shape> {
    shape_strategy().prop_map(|s| s.plug(&Shape::Int))
}

struct World {
    c: Compilation,
    list: NamedTypeId,
    pair: NamedTypeId,
    param: TemplateParamId,
}

impl World {
    fn new() -> Self {
        let c = Compilation::new();
        let list = c
            .declare_type(TypeDeclaration::class("List").with_template_parameters(["T"]))
            .unwrap();
        let pair = c
            .declare_type(TypeDeclaration::class("Pair").with_template_parameters(["A", "B"]))
            .unwrap();
        let host = c
            .declare_type(TypeDeclaration::class("Host").with_template_parameters(["T"]))
            .unwrap();
        let param = c.template_parameters(host)[0];
        Self {
            c,
            list,
            pair,
            param,
        }
    }

    fn build(
        &self,
        shape: &Shape,
    ) -> TypeSymbol {
        let c = &self.c;
        match shape {
            Shape::Int => c.get_special_type(SpecialType::Int32).into(),
            Shape::Str => c.get_special_type(SpecialType::String).into(),
            Shape::Param => self.param.into(),
            Shape::List(inner) => {
                let arg = TypeOrConstant::from(self.build(inner));
                c.construct(self.list, vec![arg]).unwrap().into()
            }
            Shape::Pair(a, b) => {
                let args = vec![
                    TypeOrConstant::from(self.build(a)),
                    TypeOrConstant::from(self.build(b)),
                ];
                c.construct(self.pair, args).unwrap().into()
            }
            Shape::Array(inner, 1) => c.sz_array_type(self.build(inner)).into(),
            Shape::Array(inner, rank) => c.array_type(self.build(inner), *rank).into(),
        }
    }
}

proptest! {
    #[test]
    fn prop_equality_matches_shape(a in shape_strategy(), b in shape_strategy()) {
        let world = World::new();
        let (x, y) = (world.build(&a), world.build(&b));
        let kind = TypeCompareKind::DEFAULT;

        prop_assert_eq!(world.c.types_equal(x, y, kind), a == b);
        prop_assert_eq!(world.c.types_equal(x, y, kind), world.c.types_equal(y, x, kind));
        if a == b {
            prop_assert_eq!(world.c.type_hash(x), world.c.type_hash(y));
        }
    }

    #[test]
    fn prop_independent_builds_are_equal(shape in shape_strategy()) {
        let world = World::new();
        let first = world.build(&shape);
        let second = world.build(&shape);

        prop_assert!(world.c.types_equal(first, second, TypeCompareKind::CONSIDER_EVERYTHING));
        prop_assert_eq!(world.c.type_hash(first), world.c.type_hash(second));
    }

    #[test]
    fn prop_substitution_plugs_parameter(open in shape_strategy(), arg in closed_shape_strategy()) {
        let world = World::new();
        let c = &world.c;
        let map = TemplateMap::new(&[world.param], &[TypeOrConstant::from(world.build(&arg))]);

        let substituted = map.substitute_type_strict(c, TypeWithAnnotations::new(world.build(&open)));
        let expected = world.build(&open.plug(&arg));
        prop_assert!(c.types_equal(substituted.ty, expected, TypeCompareKind::CONSIDER_EVERYTHING));
    }

    #[test]
    fn prop_closed_types_are_substitution_fixed_points(shape in closed_shape_strategy()) {
        let world = World::new();
        let c = &world.c;
        let map = TemplateMap::new(
            &[world.param],
            &[TypeOrConstant::from(c.get_special_type(SpecialType::Double))],
        );
        let ty = world.build(&shape);

        prop_assert_eq!(map.substitute_type_strict(c, TypeWithAnnotations::new(ty)).ty, ty);
    }
}
