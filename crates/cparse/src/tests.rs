//! End-to-end parses driven through the public [`crate::parse`] entry
//! point, covering the scenarios a caller actually cares about rather
//! than per-production unit tests (those live alongside the
//! sub-parsers in `parser/*.rs`).

use crate::ast::*;
use pretty_assertions::assert_eq;

fn parse(src: &str) -> (TranslationUnit, Vec<crate::Diagnostic>) {
    let tokens = crate::test_support::lex(src);
    crate::parse(src, &tokens, ["__builtin_va_list"])
}

#[test]
fn main_returning_zero() {
    let (unit, diags) = parse("int main(void) { return 0; }");
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(unit.0.len(), 1);
    let def = match &unit.0[0].node {
        ExternalDeclaration::FunctionDefinition(def) => &def.node,
        other => panic!("expected a function definition, got {:?}", other),
    };
    assert!(matches!(
        def.specifiers[0].node,
        DeclarationSpecifier::TypeSpecifier(ref ts) if matches!(ts.node, TypeSpecifier::Int)
    ));
    match &def.statement.node {
        Statement::Compound(items) => {
            assert_eq!(items.len(), 1);
            match &items[0].node {
                BlockItem::Statement(s) => assert!(matches!(s.node, Statement::Return(Some(_)))),
                other => panic!("expected a return statement, got {:?}", other),
            }
        }
        other => panic!("expected a compound body, got {:?}", other),
    }
}

#[test]
fn typedef_then_initialized_use() {
    let (unit, diags) = parse("typedef unsigned int u32; u32 x = 7;");
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(unit.0.len(), 2);
    match &unit.0[1].node {
        ExternalDeclaration::Declaration(decl) => {
            assert!(decl.node.specifiers.iter().any(|s| matches!(
                &s.node,
                DeclarationSpecifier::TypeSpecifier(ts)
                    if matches!(&ts.node, TypeSpecifier::TypedefName(id) if id.node.name == "u32")
            )));
            assert!(decl.node.declarators[0].node.initializer.is_some());
        }
        other => panic!("expected a declaration, got {:?}", other),
    }
}

#[test]
fn pointer_array_and_function_declarators_share_one_declaration() {
    let (unit, diags) = parse("int *a, b[10], c(int);");
    assert!(diags.is_empty(), "{:?}", diags);
    match &unit.0[0].node {
        ExternalDeclaration::Declaration(decl) => {
            let declarators = &decl.node.declarators;
            assert_eq!(declarators.len(), 3);
            assert!(matches!(
                declarators[0].node.declarator.node.derived[0].node,
                DerivedDeclarator::Pointer(_)
            ));
            assert!(matches!(
                declarators[1].node.declarator.node.derived[0].node,
                DerivedDeclarator::Array(_)
            ));
            assert!(matches!(
                declarators[2].node.declarator.node.derived[0].node,
                DerivedDeclarator::Function(_)
            ));
        }
        other => panic!("expected a declaration, got {:?}", other),
    }
}

#[test]
fn struct_with_bit_field_then_tagged_use() {
    let (unit, diags) = parse("struct S { int x; float y:3; }; struct S s;");
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(unit.0.len(), 2);
    match &unit.0[0].node {
        ExternalDeclaration::Declaration(decl) => match &decl.node.specifiers[0].node {
            DeclarationSpecifier::TypeSpecifier(ts) => match &ts.node {
                TypeSpecifier::Struct(s) => {
                    assert_eq!(s.node.identifier.as_ref().unwrap().node.name, "S");
                    let fields = s.node.declarations.as_ref().unwrap();
                    assert_eq!(fields.len(), 2);
                    assert!(fields[1].node.declarators[0].node.bit_width.is_some());
                }
                other => panic!("expected a struct type specifier, got {:?}", other),
            },
            other => panic!("expected a type specifier, got {:?}", other),
        },
        other => panic!("expected a declaration, got {:?}", other),
    }
}

#[test]
fn assignment_precedence_matches_c_table() {
    let (unit, diags) = parse("int f() { int a = 1; a += 2 * (3 + 4); return a; }");
    assert!(diags.is_empty(), "{:?}", diags);
    let def = match &unit.0[0].node {
        ExternalDeclaration::FunctionDefinition(def) => &def.node,
        other => panic!("expected a function definition, got {:?}", other),
    };
    let items = match &def.statement.node {
        Statement::Compound(items) => items,
        other => panic!("expected a compound body, got {:?}", other),
    };
    let assignment = match &items[1].node {
        BlockItem::Statement(s) => match &s.node {
            Statement::Expression(Some(expr)) => &expr.node,
            other => panic!("expected an expression statement, got {:?}", other),
        },
        other => panic!("expected a statement, got {:?}", other),
    };
    match assignment {
        Expression::BinaryOperator(top) => {
            assert_eq!(top.node.operator.node, BinaryOperator::AssignPlus);
            match &top.node.rhs.node {
                Expression::BinaryOperator(mul) => assert_eq!(mul.node.operator.node, BinaryOperator::Multiply),
                other => panic!("expected `2 * (3 + 4)` on the rhs, got {:?}", other),
            }
        }
        other => panic!("expected a top-level assignment, got {:?}", other),
    }
}

#[test]
fn function_pointer_cast() {
    let (unit, diags) = parse("void f(void) { (int (*)(int))p; }");
    assert!(diags.is_empty(), "{:?}", diags);
    let def = match &unit.0[0].node {
        ExternalDeclaration::FunctionDefinition(def) => &def.node,
        other => panic!("expected a function definition, got {:?}", other),
    };
    let items = match &def.statement.node {
        Statement::Compound(items) => items,
        other => panic!("expected a compound body, got {:?}", other),
    };
    match &items[0].node {
        BlockItem::Statement(s) => match &s.node {
            Statement::Expression(Some(expr)) => {
                assert!(matches!(expr.node, Expression::Cast(_)));
            }
            other => panic!("expected a cast expression statement, got {:?}", other),
        },
        other => panic!("expected a statement, got {:?}", other),
    }
}

#[test]
fn empty_translation_unit_is_clean() {
    let (unit, diags) = parse("");
    assert_eq!(unit.0.len(), 0);
    assert!(diags.is_empty());
}

#[test]
fn repeated_semicolons_are_equivalent_to_empty_input() {
    let (with_semis, diags_a) = parse(";;;;;");
    let (empty, diags_b) = parse("");
    assert_eq!(with_semis, empty);
    assert!(diags_a.is_empty());
    assert!(diags_b.is_empty());
}

#[test]
fn deepest_legal_paren_nesting_is_semantically_a_bare_identifier() {
    let (unit, diags) = parse("int (((x)));");
    assert!(diags.is_empty(), "{:?}", diags);
    match &unit.0[0].node {
        ExternalDeclaration::Declaration(decl) => {
            let declarator = &decl.node.declarators[0].node.declarator;
            assert!(declarator.node.derived.is_empty());
        }
        other => panic!("expected a declaration, got {:?}", other),
    }
}

#[test]
fn void_only_parameter_list_has_no_parameters_and_no_ellipsis() {
    let (unit, diags) = parse("int main(void);");
    assert!(diags.is_empty(), "{:?}", diags);
    match &unit.0[0].node {
        ExternalDeclaration::Declaration(decl) => {
            match &decl.node.declarators[0].node.declarator.node.derived[0].node {
                DerivedDeclarator::Function(f) => {
                    assert!(f.node.parameters.is_empty());
                    assert!(!f.node.ellipsis);
                }
                other => panic!("expected a function declarator, got {:?}", other),
            }
        }
        other => panic!("expected a declaration, got {:?}", other),
    }
}

#[test]
fn typedef_name_reused_as_ordinary_identifier_in_declarator_position() {
    let (unit, diags) = parse("typedef int T; T T;");
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(unit.0.len(), 2);
}
