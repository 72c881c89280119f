//! The grammar driver: ties the token view, the scope table and the
//! AST constructors together into a predictive recursive-descent
//! parser for one translation unit (§4.3).
//!
//! Sub-parsers return `Option<Node<T>>`. `None` means "this production
//! didn't match and a diagnostic was already recorded"; the caller is
//! responsible for deciding whether that's fatal to it or whether it
//! can resynchronise and keep going (§7).

mod declarations;
mod declarators;
mod expressions;
mod statements;

use crate::ast::*;
use crate::diagnostics::Diagnostic;
use crate::env::Env;
use crate::span::{Node, Span};
use crate::token::{Token, TokenKind, TokenView};

/// Parses a full translation unit out of an already-lexed token
/// stream. `typedef_seed` pre-declares typedef names in the global
/// scope before parsing starts (§6, "Scope seed"), e.g.
/// `__builtin_va_list`.
pub fn parse<'a>(
    source: &str,
    tokens: &'a [Token],
    typedef_seed: impl IntoIterator<Item = &'a str>,
) -> (TranslationUnit, Vec<Diagnostic>) {
    let mut parser = Parser::new(source, tokens);
    for name in typedef_seed {
        parser.env.declare_typedef(name);
    }
    let unit = parser.parse_translation_unit();
    debug_assert!(
        parser.env.is_at_global_scope(),
        "scope push/pop imbalance at end of parse"
    );
    (unit, parser.diagnostics)
}

pub(crate) struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) view: TokenView<'a>,
    pub(crate) env: Env,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Parser {
            source,
            view: TokenView::new(tokens),
            env: Env::new(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let span = self.view.span();
        self.diagnostics.push(Diagnostic::at(self.source, span, message));
    }

    /// `expected X, got Y` (§7, category 1).
    pub(crate) fn error_expected(&mut self, what: &str) {
        let got = self.view.current().text().to_owned();
        let got = if got.is_empty() {
            format!("{:?}", self.view.kind())
        } else {
            got
        };
        self.error(format!("expected {}, got '{}'", what, got));
    }

    /// Consumes `kind` if present; otherwise records a "missing
    /// terminator" diagnostic (§7, category 2) and does not advance.
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.view.eat(kind) {
            true
        } else {
            self.error_expected(what);
            false
        }
    }

    /// Advances past tokens until a statement/declaration boundary —
    /// `;` (consumed) or a `}` (left for the caller to consume) — so a
    /// single missed production doesn't cascade into unrelated
    /// diagnostics (§7, "Propagation").
    pub(crate) fn resynchronize(&mut self) {
        loop {
            match self.view.kind() {
                TokenKind::Semi => {
                    self.view.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => self.view.advance(),
            }
        }
    }

    fn span_from(&self, start: Span) -> Span {
        start.join(self.view.peek(0).span())
    }

    // ---- §4.3: translation unit / external declaration ----

    fn parse_translation_unit(&mut self) -> TranslationUnit {
        let mut items = Vec::new();
        while !self.view.is_at_end() {
            if self.view.eat(TokenKind::Semi) {
                // An empty top-level `;` is a legal (empty) declaration.
                continue;
            }
            match self.parse_external_declaration() {
                Some(node) => items.push(node),
                None => {
                    if !self.view.is_at_end() {
                        self.resynchronize();
                    }
                }
            }
        }
        TranslationUnit(items)
    }

    fn parse_external_declaration(&mut self) -> Option<Node<ExternalDeclaration>> {
        let start = self.view.span();
        let specifiers = self.parse_declaration_specifiers()?;

        if self.view.eat(TokenKind::Semi) {
            // Tag-only declaration: `struct S { ... };`, `enum E;`.
            let decl = Declaration {
                specifiers,
                declarators: Vec::new(),
            };
            return Some(Node::new(
                ExternalDeclaration::Declaration(Node::new(decl, self.span_from(start))),
                self.span_from(start),
            ));
        }

        let declarator = self.parse_declarator()?;

        if self.view.kind() == TokenKind::LBrace {
            return self.parse_function_definition(start, specifiers, declarator, Vec::new());
        }

        // K&R-style: `int f(a, b) int a; int b; { ... }` — old-style
        // parameter declarations appear between the declarator and
        // the compound statement.
        if declarator_is_kr_function(&declarator)
            && matches!(
                self.view.kind(),
                TokenKind::Int
                    | TokenKind::Char
                    | TokenKind::Short
                    | TokenKind::Long
                    | TokenKind::Float
                    | TokenKind::Double
                    | TokenKind::Signed
                    | TokenKind::Unsigned
                    | TokenKind::Void
                    | TokenKind::Struct
                    | TokenKind::Union
                    | TokenKind::Enum
                    | TokenKind::Const
                    | TokenKind::Volatile
            )
        {
            let mut kr_declarations = Vec::new();
            while self.declaration_specifiers_first() {
                if let Some(d) = self.parse_declaration() {
                    kr_declarations.push(d);
                } else {
                    self.resynchronize();
                }
            }
            return self.parse_function_definition(start, specifiers, declarator, kr_declarations);
        }

        let init_declarators = self.finish_init_declarator_list(declarator)?;
        if !self.expect(TokenKind::Semi, "';'") {
            self.resynchronize();
        }
        self.bind_declared_names(&specifiers, &init_declarators);

        let decl = Declaration {
            specifiers,
            declarators: init_declarators,
        };
        Some(Node::new(
            ExternalDeclaration::Declaration(Node::new(decl, self.span_from(start))),
            self.span_from(start),
        ))
    }

    fn parse_function_definition(
        &mut self,
        start: Span,
        specifiers: Vec<Node<DeclarationSpecifier>>,
        declarator: Node<Declarator>,
        declarations: Vec<Node<Declaration>>,
    ) -> Option<Node<ExternalDeclaration>> {
        // §4.3: "Require the outer-most DirectDeclarator suffix to be
        // a function suffix." Anything else reaching here followed by
        // `{` is an unresolved ambiguity (§7, category 4), not a
        // function definition with an implicit empty parameter list.
        if !matches!(
            declarator.node.derived.last().map(|d| &d.node),
            Some(DerivedDeclarator::Function(_)) | Some(DerivedDeclarator::KRFunction(_))
        ) {
            self.error("function definition requires a function declarator with a parameter list");
            return None;
        }

        self.env.enter();
        bind_parameter_names(&mut self.env, &declarator);
        let body = self.parse_compound_statement_inner();
        self.env.leave();
        let body = body?;

        if let DeclaratorKind::Identifier(ident) = &declarator.node.kind.node {
            self.env.declare_ordinary(ident.node.name.clone());
        }

        let def = FunctionDefinition {
            specifiers,
            declarator,
            declarations,
            statement: body,
        };
        Some(Node::new(
            ExternalDeclaration::FunctionDefinition(Node::new(def, self.span_from(start))),
            self.span_from(start),
        ))
    }
}

/// True if the outermost derived-declarator suffix is a K&R
/// (identifier-list) function suffix.
fn declarator_is_kr_function(declarator: &Node<Declarator>) -> bool {
    matches!(
        declarator.node.derived.last().map(|d| &d.node),
        Some(DerivedDeclarator::KRFunction(names)) if !names.is_empty()
    )
}

/// Binds every named parameter of a function declarator as an
/// ordinary identifier in the (already pushed) function-body scope
/// (§4.3: "bind each named parameter as ordinary").
fn bind_parameter_names(env: &mut Env, declarator: &Node<Declarator>) {
    for derived in &declarator.node.derived {
        match &derived.node {
            DerivedDeclarator::Function(f) => {
                for param in &f.node.parameters {
                    if let Some(d) = &param.node.declarator {
                        if let Some(name) = declarator_name(d) {
                            env.declare_ordinary(name);
                        }
                    }
                }
            }
            DerivedDeclarator::KRFunction(names) => {
                for name in names {
                    env.declare_ordinary(name.node.name.clone());
                }
            }
            _ => {}
        }
    }
}

pub(crate) fn declarator_name(declarator: &Node<Declarator>) -> Option<String> {
    match &declarator.node.kind.node {
        DeclaratorKind::Identifier(ident) => Some(ident.node.name.clone()),
        DeclaratorKind::Declarator(inner) => declarator_name(inner),
        DeclaratorKind::Abstract => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(src: &str) -> (TranslationUnit, Vec<Diagnostic>) {
        let tokens = crate::test_support::lex(src);
        parse(src, &tokens, [])
    }

    #[test]
    fn empty_translation_unit_has_no_errors() {
        let (unit, diags) = parse_str("");
        assert!(unit.0.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn repeated_semicolons_yield_empty_unit() {
        let (unit, diags) = parse_str(";;;");
        assert!(unit.0.is_empty());
        assert!(diags.is_empty());
    }

    #[test]
    fn simple_main_function() {
        let (unit, diags) = parse_str("int main(void) { return 0; }");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(unit.0.len(), 1);
        match &unit.0[0].node {
            ExternalDeclaration::FunctionDefinition(def) => {
                assert_eq!(declarator_name(&def.node.declarator).as_deref(), Some("main"));
            }
            other => panic!("expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn typedef_then_use_as_type_specifier() {
        let (unit, diags) = parse_str("typedef unsigned int u32; u32 x;");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(unit.0.len(), 2);
        match &unit.0[1].node {
            ExternalDeclaration::Declaration(decl) => {
                let has_typedef_name = decl.node.specifiers.iter().any(|s| {
                    matches!(
                        &s.node,
                        DeclarationSpecifier::TypeSpecifier(ts)
                            if matches!(&ts.node, TypeSpecifier::TypedefName(id) if id.node.name == "u32")
                    )
                });
                assert!(has_typedef_name, "{:?}", decl.node.specifiers);
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn typedef_redeclared_as_ordinary_in_declarator_context() {
        // `typedef int T; T T;` -- the second `T` is an ordinary
        // identifier in declarator position even though it's also a
        // typedef name; only the specifier position consults the
        // scope table.
        let (unit, diags) = parse_str("typedef int T; T T;");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(unit.0.len(), 2);
    }

    #[test]
    fn multi_declarator_declaration() {
        let (unit, diags) = parse_str("int *a, b[10], c(int);");
        assert!(diags.is_empty(), "{:?}", diags);
        match &unit.0[0].node {
            ExternalDeclaration::Declaration(decl) => {
                assert_eq!(decl.node.declarators.len(), 3);
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn struct_with_bitfield_then_use() {
        let (unit, diags) = parse_str("struct S { int x; float y:3; }; struct S s;");
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(unit.0.len(), 2);
    }
}
