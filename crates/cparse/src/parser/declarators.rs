//! §4.6: declarators, direct declarators, abstract declarators, and
//! the parameter-declaration disambiguation algorithm.

use super::Parser;
use crate::ast::*;
use crate::span::Node;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    /// `declarator = pointer* direct-declarator`. In this (concrete)
    /// context a `(` at the direct-declarator head is always a
    /// parenthesised nested declarator: the grammar requires a name
    /// somewhere inside, so there is no "anonymous parameter list"
    /// reading to disambiguate against here (that ambiguity only
    /// arises for parameter/abstract declarators, see
    /// `parse_parameter_declarator`).
    pub(crate) fn parse_declarator(&mut self) -> Option<Node<Declarator>> {
        let start = self.view.span();
        let mut derived = self.parse_pointer_chain();

        let kind = if self.view.kind() == TokenKind::Identifier {
            let name = self.view.current().text().to_owned();
            let span = self.view.span();
            self.view.advance();
            Node::new(DeclaratorKind::Identifier(Node::new(Identifier { name }, span)), span)
        } else if self.view.eat(TokenKind::LParen) {
            let inner = self.parse_declarator()?;
            self.expect(TokenKind::RParen, "')'");
            let span = inner.span;
            Node::new(DeclaratorKind::Declarator(Box::new(inner)), span)
        } else {
            self.error_expected("a declarator (an identifier or a parenthesised declarator)");
            return None;
        };

        self.parse_direct_declarator_suffixes(&mut derived)?;

        Some(Node::new(
            Declarator { kind, derived },
            self.view.span().join(start),
        ))
    }

    fn parse_pointer_chain(&mut self) -> Vec<Node<DerivedDeclarator>> {
        let mut derived = Vec::new();
        while self.view.eat(TokenKind::Star) {
            let mut quals = Vec::new();
            loop {
                let span = self.view.span();
                let q = match self.view.kind() {
                    TokenKind::Const => TypeQualifier::Const,
                    TokenKind::Restrict => TypeQualifier::Restrict,
                    TokenKind::Volatile => TypeQualifier::Volatile,
                    _ => break,
                };
                self.view.advance();
                quals.push(Node::new(q, span));
            }
            derived.push(Node::new(DerivedDeclarator::Pointer(quals), self.view.span()));
        }
        derived
    }

    /// Array `[...]` and function `(...)` suffixes, chained left to
    /// right — the left-recursion-elimination "suffix loop" for
    /// direct-declarator (§4.6 point 2–3).
    fn parse_direct_declarator_suffixes(
        &mut self,
        derived: &mut Vec<Node<DerivedDeclarator>>,
    ) -> Option<()> {
        loop {
            match self.view.kind() {
                TokenKind::LBracket => {
                    let node = self.parse_array_declarator_suffix()?;
                    derived.push(node);
                }
                TokenKind::LParen => {
                    let node = self.parse_function_declarator_suffix()?;
                    derived.push(node);
                }
                _ => break,
            }
        }
        Some(())
    }

    fn parse_array_declarator_suffix(&mut self) -> Option<Node<DerivedDeclarator>> {
        let start = self.view.span();
        self.expect(TokenKind::LBracket, "'['");

        // `static` may appear before or interleaved with a
        // type-qualifier list; a trailing `static` is not legal C but
        // we accept the common "qualifiers then optional static"
        // shape plus a single leading `static`, matching §4.6 point 2.
        let mut is_static = self.view.eat(TokenKind::Static);
        let mut qualifiers = Vec::new();
        while self.view.kind() == TokenKind::Const
            || self.view.kind() == TokenKind::Restrict
            || self.view.kind() == TokenKind::Volatile
        {
            let span = self.view.span();
            let q = match self.view.kind() {
                TokenKind::Const => TypeQualifier::Const,
                TokenKind::Restrict => TypeQualifier::Restrict,
                TokenKind::Volatile => TypeQualifier::Volatile,
                _ => unreachable!(),
            };
            self.view.advance();
            qualifiers.push(Node::new(q, span));
        }
        if !is_static {
            is_static = self.view.eat(TokenKind::Static);
        }

        let size = if self.view.kind() == TokenKind::RBracket {
            ArraySize::Unknown
        } else if self.view.eat(TokenKind::Star) && self.view.kind() == TokenKind::RBracket {
            ArraySize::VlaUnspecified
        } else {
            let expr = Box::new(self.parse_assignment_expression()?);
            if is_static {
                ArraySize::StaticExpression(expr)
            } else {
                ArraySize::VariableExpression(expr)
            }
        };

        self.expect(TokenKind::RBracket, "']'");
        Some(Node::new(
            DerivedDeclarator::Array(Node::new(ArrayDeclarator { qualifiers, size }, self.view.span())),
            self.view.span().join(start),
        ))
    }

    fn parse_function_declarator_suffix(&mut self) -> Option<Node<DerivedDeclarator>> {
        let start = self.view.span();
        self.expect(TokenKind::LParen, "'('");

        if self.view.kind() == TokenKind::RParen {
            self.view.advance();
            return Some(Node::new(
                DerivedDeclarator::Function(Node::new(
                    FunctionDeclarator {
                        parameters: Vec::new(),
                        ellipsis: false,
                    },
                    self.view.span(),
                )),
                self.view.span().join(start),
            ));
        }

        // `(void)` is a zero-parameter prototype, not a parameter
        // named after the `void` type (§8: "A function with `(void)`
        // parameter list produces a ParameterList of length 0").
        if self.view.kind() == TokenKind::Void && self.view.kind_at(1) == TokenKind::RParen {
            self.view.advance();
            self.view.advance();
            return Some(Node::new(
                DerivedDeclarator::Function(Node::new(
                    FunctionDeclarator {
                        parameters: Vec::new(),
                        ellipsis: false,
                    },
                    self.view.span(),
                )),
                self.view.span().join(start),
            ));
        }

        // K&R identifier-list: `f(a, b)` where `a`/`b` are not
        // currently typedef names and no type specifier starts the
        // list.
        if self.view.kind() == TokenKind::Identifier
            && !self.env.is_typedef_in_scope(self.view.current().text())
            && (self.view.kind_at(1) == TokenKind::Comma || self.view.kind_at(1) == TokenKind::RParen)
        {
            let mut names = Vec::new();
            loop {
                if self.view.kind() != TokenKind::Identifier {
                    break;
                }
                let name = self.view.current().text().to_owned();
                let span = self.view.span();
                self.view.advance();
                names.push(Node::new(Identifier { name }, span));
                if !self.view.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'");
            return Some(Node::new(
                DerivedDeclarator::KRFunction(names),
                self.view.span().join(start),
            ));
        }

        let (parameters, ellipsis) = self.parse_parameter_type_list()?;
        self.expect(TokenKind::RParen, "')'");
        Some(Node::new(
            DerivedDeclarator::Function(Node::new(FunctionDeclarator { parameters, ellipsis }, self.view.span())),
            self.view.span().join(start),
        ))
    }

    fn parse_parameter_type_list(&mut self) -> Option<(Vec<Node<ParameterDeclaration>>, bool)> {
        let mut parameters = Vec::new();
        let mut ellipsis = false;
        loop {
            if self.view.eat(TokenKind::Ellipsis) {
                ellipsis = true;
                break;
            }
            parameters.push(self.parse_parameter_declaration()?);
            if !self.view.eat(TokenKind::Comma) {
                break;
            }
        }
        Some((parameters, ellipsis))
    }

    fn parse_parameter_declaration(&mut self) -> Option<Node<ParameterDeclaration>> {
        let start = self.view.span();
        let specifiers = self.parse_declaration_specifiers()?;
        let declarator = Some(self.parse_parameter_declarator()?);
        Some(Node::new(
            ParameterDeclaration { specifiers, declarator },
            self.view.span().join(start),
        ))
    }

    /// §4.6's parameter-declaration disambiguation: decide, with a
    /// bounded scan that never mutates the cursor beyond its own
    /// lookahead, whether what follows the specifiers is a concrete
    /// declarator (has a name) or an abstract one (doesn't), then
    /// dispatch to the matching parser. Both branches always produce
    /// a declarator node — a wholly empty abstract declarator (no
    /// pointers, no suffixes) is how "no declarator at all" shows up.
    fn parse_parameter_declarator(&mut self) -> Option<Node<Declarator>> {
        let abstract_declarator = self.looks_like_abstract_declarator();
        #[cfg(feature = "trace")]
        log::trace!(
            "parameter-declarator disambiguation at byte {}: {}",
            self.view.span().start,
            if abstract_declarator { "abstract" } else { "concrete" }
        );
        if abstract_declarator {
            self.parse_abstract_declarator()
        } else {
            self.parse_declarator()
        }
    }

    fn looks_like_abstract_declarator(&self) -> bool {
        let mut n = 0;
        while self.view.kind_at(n) == TokenKind::Star {
            n += 1;
            // a pointer may be followed by a type-qualifier list
            while matches!(
                self.view.kind_at(n),
                TokenKind::Const | TokenKind::Restrict | TokenKind::Volatile
            ) {
                n += 1;
            }
        }
        match self.view.kind_at(n) {
            TokenKind::LBracket => true,
            TokenKind::Identifier => false,
            TokenKind::LParen => {
                // Descend through nested `(`s; the first non-`(`
                // token decides.
                let mut depth = 0usize;
                loop {
                    match self.view.kind_at(n) {
                        TokenKind::LParen => {
                            depth += 1;
                            n += 1;
                        }
                        TokenKind::Identifier if depth > 0 => return false,
                        _ => return true,
                    }
                }
            }
            // Neither `[`/identifier/`(` follows (whether or not a
            // `*` was consumed): §4.6 point-by-point algorithm calls
            // both sub-cases abstract — pointers-only, or a wholly
            // empty abstract declarator.
            _ => true,
        }
    }

    // ---- abstract declarators ----

    pub(crate) fn parse_abstract_declarator(&mut self) -> Option<Node<Declarator>> {
        let start = self.view.span();
        let mut derived = self.parse_pointer_chain();

        let kind = if self.view.kind() == TokenKind::LParen && !self.begins_declaration_specifier_at(1) {
            // `( abstract-declarator )`, not an anonymous head
            // immediately followed by a parameter list (§4.6 point 1)
            // — that case is left for the suffix loop below, which
            // treats the still-unconsumed `(` as a function suffix.
            self.view.advance();
            let inner = self.parse_abstract_declarator()?;
            self.expect(TokenKind::RParen, "')'");
            let span = inner.span;
            Node::new(DeclaratorKind::Declarator(Box::new(inner)), span)
        } else {
            Node::new(DeclaratorKind::Abstract, start)
        };

        self.parse_direct_declarator_suffixes(&mut derived)?;

        Some(Node::new(
            Declarator { kind, derived },
            self.view.span().join(start),
        ))
    }

    /// Whether the token `n` places ahead of the cursor could begin a
    /// declaration-specifier list (used for the `(` head disambiguation
    /// in abstract-declarator position).
    fn begins_declaration_specifier_at(&self, n: usize) -> bool {
        use TokenKind::*;
        match self.view.kind_at(n) {
            Void | Char | Short | Int | Long | Float | Double | Signed | Unsigned | Bool
            | Struct | Union | Enum | Const | Restrict | Volatile => true,
            Identifier => self.env.is_typedef_in_scope(self.view.peek(n).text()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declare(src: &str) -> (crate::ast::TranslationUnit, Vec<crate::diagnostics::Diagnostic>) {
        let tokens = crate::test_support::lex(src);
        crate::parser::parse(src, &tokens, [])
    }

    #[test]
    fn parenthesised_declarator_nesting_is_transparent() {
        let (unit, diags) = declare("int (((x)));");
        assert!(diags.is_empty(), "{:?}", diags);
        match &unit.0[0].node {
            ExternalDeclaration::Declaration(decl) => {
                let d = &decl.node.declarators[0].node.declarator;
                assert!(d.node.derived.is_empty());
                let mut kind = &d.node.kind.node;
                let mut depth = 0;
                while let DeclaratorKind::Declarator(inner) = kind {
                    kind = &inner.node.kind.node;
                    depth += 1;
                }
                assert_eq!(depth, 2);
                assert!(matches!(kind, DeclaratorKind::Identifier(id) if id.node.name == "x"));
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn void_parameter_list_is_empty() {
        let (unit, diags) = declare("int main(void);");
        assert!(diags.is_empty(), "{:?}", diags);
        match &unit.0[0].node {
            ExternalDeclaration::Declaration(decl) => {
                let d = &decl.node.declarators[0].node.declarator;
                match &d.node.derived[0].node {
                    DerivedDeclarator::Function(f) => {
                        assert!(f.node.parameters.is_empty());
                        assert!(!f.node.ellipsis);
                    }
                    other => panic!("{:?}", other),
                }
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn function_pointer_parameter_is_abstract_declarator() {
        let (unit, diags) = declare("void signal(int (*handler)(int));");
        assert!(diags.is_empty(), "{:?}", diags);
        match &unit.0[0].node {
            ExternalDeclaration::Declaration(decl) => {
                let d = &decl.node.declarators[0].node.declarator;
                match &d.node.derived[0].node {
                    DerivedDeclarator::Function(f) => {
                        assert_eq!(f.node.parameters.len(), 1);
                        let param = &f.node.parameters[0].node;
                        let declarator = param.declarator.as_ref().expect("named parameter");
                        assert!(matches!(
                            &declarator.node.kind.node,
                            DeclaratorKind::Declarator(_)
                        ));
                    }
                    other => panic!("{:?}", other),
                }
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn cast_to_function_pointer_type() {
        // `(int (*)(int))p;` exercises the same parameter-declarator
        // disambiguation from inside a type-name/cast rather than a
        // function prototype.
        let (unit, diags) = declare("void f(void) { (int (*)(int))p; }");
        assert!(diags.is_empty(), "{:?}", diags);
    }
}
