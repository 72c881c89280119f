//! §4.8: the expression precedence cascade, type names, and
//! initializers.
//!
//! Each precedence level gets its own method, chained in the
//! conventional recursive-descent-for-precedence-climbing shape: every
//! level parses one operand at the level below it, then loops over its
//! own operators. Assignment is right-associative and folds in as just
//! another `BinaryOperator` (see `ast::BinaryOperator::is_assignment`).

use super::Parser;
use crate::ast::*;
use crate::diagnostics::ParseError;
use crate::span::Node;
use crate::token::{LiteralValue, TokenKind, TokenRef};

impl<'a> Parser<'a> {
    /// `expression = assignment-expression (',' assignment-expression)*`
    pub(crate) fn parse_expression(&mut self) -> Option<Node<Expression>> {
        let start = self.view.span();
        let first = self.parse_assignment_expression()?;
        if self.view.kind() != TokenKind::Comma {
            return Some(first);
        }
        let mut items = vec![first];
        while self.view.eat(TokenKind::Comma) {
            items.push(self.parse_assignment_expression()?);
        }
        Some(Node::new(
            Expression::Comma(Box::new(items)),
            self.view.span().join(start),
        ))
    }

    /// `conditional-expression (assignment-operator assignment-expression)?`
    ///
    /// A `unary-expression` is also a `conditional-expression`, so no
    /// separate lookahead is needed to tell an assignment target from
    /// an ordinary expression: parse the conditional first, then check
    /// whether an assignment operator follows.
    pub(crate) fn parse_assignment_expression(&mut self) -> Option<Node<Expression>> {
        let start = self.view.span();
        let lhs = self.parse_conditional_expression()?;
        if !self.view.kind().is_assignment_operator() {
            return Some(lhs);
        }
        let operator = Node::new(assignment_operator(self.view.kind()), self.view.span());
        self.view.advance();
        let rhs = self.parse_assignment_expression()?;
        Some(Node::new(
            Expression::BinaryOperator(Box::new(Node::new(
                BinaryOperatorExpression {
                    operator,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                self.view.span().join(start),
            ))),
            self.view.span().join(start),
        ))
    }

    /// `logical-or-expression ('?' expression ':' conditional-expression)?`
    pub(crate) fn parse_conditional_expression(&mut self) -> Option<Node<Expression>> {
        let start = self.view.span();
        let condition = self.parse_binary_expression(0)?;
        if !self.view.eat(TokenKind::Question) {
            return Some(condition);
        }
        let then_expression = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':'");
        let else_expression = self.parse_conditional_expression()?;
        Some(Node::new(
            Expression::Conditional(Box::new(Node::new(
                ConditionalExpression {
                    condition: Box::new(condition),
                    then_expression: Box::new(then_expression),
                    else_expression: Box::new(else_expression),
                },
                self.view.span().join(start),
            ))),
            self.view.span().join(start),
        ))
    }

    /// The binary-operator precedence ladder from `||` down to `*`,
    /// driven by a single precedence-climbing loop indexed by `level`
    /// into [`BINARY_LEVELS`] rather than one method per level — the
    /// eleven C99 binary precedence levels differ only in which
    /// operator tokens they accept.
    fn parse_binary_expression(&mut self, level: usize) -> Option<Node<Expression>> {
        if level == BINARY_LEVELS.len() {
            return self.parse_cast_expression();
        }
        let start = self.view.span();
        let mut lhs = self.parse_binary_expression(level + 1)?;
        loop {
            let op = match binary_operator_at(self.view.kind(), BINARY_LEVELS[level], self.view.span().start) {
                Ok(Some(op)) => op,
                Ok(None) => break,
                Err(err) => {
                    self.error(err.to_string());
                    break;
                }
            };
            let op_span = self.view.span();
            self.view.advance();
            let rhs = self.parse_binary_expression(level + 1)?;
            lhs = Node::new(
                Expression::BinaryOperator(Box::new(Node::new(
                    BinaryOperatorExpression {
                        operator: Node::new(op, op_span),
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    self.view.span().join(start),
                ))),
                self.view.span().join(start),
            );
        }
        Some(lhs)
    }

    /// `'(' type-name ')' cast-expression | unary-expression`
    ///
    /// Disambiguated the same way as in `declarators.rs`: a `(`
    /// immediately followed by a declaration-specifier is a cast (or,
    /// if a `{` follows the matching `)`, a compound literal); anything
    /// else falls through to a parenthesised/unary expression instead.
    fn parse_cast_expression(&mut self) -> Option<Node<Expression>> {
        let start = self.view.span();
        if self.view.kind() == TokenKind::LParen && self.begins_declaration_specifier_at(1) {
            self.view.advance();
            let type_name = self.parse_type_name()?;
            self.expect(TokenKind::RParen, "')'");
            if self.view.kind() == TokenKind::LBrace {
                return self.parse_compound_literal(start, type_name);
            }
            let operand = self.parse_cast_expression()?;
            return Some(Node::new(
                Expression::Cast(Box::new(Node::new(
                    CastExpression {
                        type_name,
                        expression: Box::new(operand),
                    },
                    self.view.span().join(start),
                ))),
                self.view.span().join(start),
            ));
        }
        self.parse_unary_expression()
    }

    fn parse_compound_literal(&mut self, start: crate::span::Span, type_name: Node<TypeName>) -> Option<Node<Expression>> {
        let initializer_list = self.parse_braced_initializer_list()?;
        Some(Node::new(
            Expression::CompoundLiteral(Box::new(Node::new(
                CompoundLiteral {
                    type_name,
                    initializer_list,
                },
                self.view.span().join(start),
            ))),
            self.view.span().join(start),
        ))
    }

    /// `unary-operator cast-expression | postfix-expression`, plus the
    /// two `sizeof` productions (§4.8: `sizeof` binds to either a
    /// parenthesised type name or an ordinary unary-expression operand).
    fn parse_unary_expression(&mut self) -> Option<Node<Expression>> {
        let start = self.view.span();
        let unary_op = match self.view.kind() {
            TokenKind::PlusPlus => Some(UnaryOperator::PreIncrement),
            TokenKind::MinusMinus => Some(UnaryOperator::PreDecrement),
            TokenKind::Amp => Some(UnaryOperator::Address),
            TokenKind::Star => Some(UnaryOperator::Indirection),
            TokenKind::Plus => Some(UnaryOperator::Plus),
            TokenKind::Minus => Some(UnaryOperator::Minus),
            TokenKind::Tilde => Some(UnaryOperator::Complement),
            TokenKind::Bang => Some(UnaryOperator::Negate),
            _ => None,
        };
        if let Some(op) = unary_op {
            let op_span = self.view.span();
            self.view.advance();
            let operand = self.parse_cast_expression()?;
            return Some(Node::new(
                Expression::UnaryOperator(Box::new(Node::new(
                    UnaryOperatorExpression {
                        operator: Node::new(op, op_span),
                        operand: Box::new(operand),
                    },
                    self.view.span().join(start),
                ))),
                self.view.span().join(start),
            ));
        }

        if self.view.kind() == TokenKind::Sizeof {
            self.view.advance();
            if self.view.kind() == TokenKind::LParen && self.begins_declaration_specifier_at(1) {
                self.view.advance();
                let type_name = self.parse_type_name()?;
                self.expect(TokenKind::RParen, "')'");
                return Some(Node::new(
                    Expression::SizeOfType(Box::new(type_name)),
                    self.view.span().join(start),
                ));
            }
            let operand = self.parse_unary_expression()?;
            return Some(Node::new(
                Expression::UnaryOperator(Box::new(Node::new(
                    UnaryOperatorExpression {
                        operator: Node::new(UnaryOperator::SizeOf, start),
                        operand: Box::new(operand),
                    },
                    self.view.span().join(start),
                ))),
                self.view.span().join(start),
            ));
        }

        self.parse_postfix_expression()
    }

    /// `primary-expression` followed by any number of subscript, call,
    /// member-access, and post-increment/decrement suffixes (§4.8
    /// Postfix). A compound literal is recognised here too, since
    /// `( type-name ) { ... }` only differs from a cast by the trailing
    /// `{` — that decision already happened in `parse_cast_expression`,
    /// so by the time control reaches here a parenthesised primary is
    /// always an ordinary expression.
    fn parse_postfix_expression(&mut self) -> Option<Node<Expression>> {
        let start = self.view.span();
        let mut expr = self.parse_primary_expression()?;
        loop {
            match self.view.kind() {
                TokenKind::LBracket => {
                    self.view.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'");
                    expr = Node::new(
                        Expression::BinaryOperator(Box::new(Node::new(
                            BinaryOperatorExpression {
                                operator: Node::new(BinaryOperator::Index, start),
                                lhs: Box::new(expr),
                                rhs: Box::new(index),
                            },
                            self.view.span().join(start),
                        ))),
                        self.view.span().join(start),
                    );
                }
                TokenKind::LParen => {
                    self.view.advance();
                    let mut arguments = Vec::new();
                    if self.view.kind() != TokenKind::RParen {
                        loop {
                            arguments.push(self.parse_assignment_expression()?);
                            if !self.view.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')'");
                    expr = Node::new(
                        Expression::Call(Box::new(Node::new(
                            CallExpression {
                                callee: Box::new(expr),
                                arguments,
                            },
                            self.view.span().join(start),
                        ))),
                        self.view.span().join(start),
                    );
                }
                TokenKind::Dot | TokenKind::Arrow => {
                    let operator = if self.view.kind() == TokenKind::Dot {
                        MemberOperator::Direct
                    } else {
                        MemberOperator::Indirect
                    };
                    let op_span = self.view.span();
                    self.view.advance();
                    if self.view.kind() != TokenKind::Identifier {
                        self.error_expected("a member name");
                        return None;
                    }
                    let name = self.view.current().text().to_owned();
                    let ident_span = self.view.span();
                    self.view.advance();
                    expr = Node::new(
                        Expression::Member(Box::new(Node::new(
                            MemberExpression {
                                operator: Node::new(operator, op_span),
                                expression: Box::new(expr),
                                identifier: Node::new(Identifier { name }, ident_span),
                            },
                            self.view.span().join(start),
                        ))),
                        self.view.span().join(start),
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.view.kind() == TokenKind::PlusPlus {
                        UnaryOperator::PostIncrement
                    } else {
                        UnaryOperator::PostDecrement
                    };
                    let op_span = self.view.span();
                    self.view.advance();
                    expr = Node::new(
                        Expression::UnaryOperator(Box::new(Node::new(
                            UnaryOperatorExpression {
                                operator: Node::new(op, op_span),
                                operand: Box::new(expr),
                            },
                            self.view.span().join(start),
                        ))),
                        self.view.span().join(start),
                    );
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_primary_expression(&mut self) -> Option<Node<Expression>> {
        let start = self.view.span();
        match self.view.kind() {
            TokenKind::Identifier => {
                let name = self.view.current().text().to_owned();
                self.view.advance();
                Some(Node::new(
                    Expression::Identifier(Box::new(Node::new(Identifier { name }, start))),
                    start,
                ))
            }
            TokenKind::NumericConstant => {
                let constant = constant_from_numeric_token(self.view.current());
                self.view.advance();
                Some(Node::new(
                    Expression::Constant(Box::new(Node::new(constant, start))),
                    start,
                ))
            }
            TokenKind::CharConstant => {
                let text = self.view.current().text().to_owned();
                self.view.advance();
                Some(Node::new(
                    Expression::Constant(Box::new(Node::new(Constant::Character(text), start))),
                    start,
                ))
            }
            TokenKind::StringLiteral => {
                let mut parts = vec![self.view.current().text().to_owned()];
                self.view.advance();
                while self.view.kind() == TokenKind::StringLiteral {
                    parts.push(self.view.current().text().to_owned());
                    self.view.advance();
                }
                Some(Node::new(
                    Expression::StringLiteral(Box::new(Node::new(parts, start))),
                    self.view.span().join(start),
                ))
            }
            TokenKind::LParen => {
                self.view.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'");
                Some(inner)
            }
            _ => {
                self.error_expected("an expression");
                None
            }
        }
    }

    // ---- §4.6 cont'd: type names used by casts, sizeof, compound literals ----

    pub(crate) fn parse_type_name(&mut self) -> Option<Node<TypeName>> {
        let start = self.view.span();
        let specifiers = self.parse_specifier_qualifier_list()?;
        let declarator = if matches!(
            self.view.kind(),
            TokenKind::Star | TokenKind::LBracket | TokenKind::LParen
        ) {
            Some(self.parse_abstract_declarator()?)
        } else {
            None
        };
        Some(Node::new(
            TypeName { specifiers, declarator },
            self.view.span().join(start),
        ))
    }

    // ---- §4.9: initializers ----

    pub(crate) fn parse_initializer(&mut self) -> Option<Node<Initializer>> {
        if self.view.kind() == TokenKind::LBrace {
            let start = self.view.span();
            let items = self.parse_braced_initializer_list()?;
            return Some(Node::new(Initializer::List(items), self.view.span().join(start)));
        }
        let expr = self.parse_assignment_expression()?;
        let span = expr.span;
        Some(Node::new(Initializer::Expression(Box::new(expr)), span))
    }

    fn parse_braced_initializer_list(&mut self) -> Option<Vec<Node<InitializerListItem>>> {
        self.expect(TokenKind::LBrace, "'{'");
        let mut items = Vec::new();
        while self.view.kind() != TokenKind::RBrace && !self.view.is_at_end() {
            items.push(self.parse_initializer_list_item()?);
            if !self.view.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Some(items)
    }

    fn parse_initializer_list_item(&mut self) -> Option<Node<InitializerListItem>> {
        let start = self.view.span();
        let mut designation = Vec::new();
        loop {
            match self.view.kind() {
                TokenKind::LBracket => {
                    self.view.advance();
                    let index = self.parse_conditional_expression()?;
                    self.expect(TokenKind::RBracket, "']'");
                    designation.push(Node::new(Designator::Index(index), self.view.span().join(start)));
                }
                TokenKind::Dot => {
                    self.view.advance();
                    if self.view.kind() != TokenKind::Identifier {
                        self.error_expected("a member designator");
                        return None;
                    }
                    let name = self.view.current().text().to_owned();
                    let span = self.view.span();
                    self.view.advance();
                    designation.push(Node::new(
                        Designator::Member(Node::new(Identifier { name }, span)),
                        self.view.span().join(start),
                    ));
                }
                _ => break,
            }
        }
        if !designation.is_empty() {
            self.expect(TokenKind::Eq, "'='");
        }
        let initializer = Box::new(self.parse_initializer()?);
        Some(Node::new(
            InitializerListItem { designation, initializer },
            self.view.span().join(start),
        ))
    }
}

/// One binary-precedence level as the set of token kinds accepted at
/// it, ordered loosest-to-tightest to match the index `parse_binary_expression`
/// climbs with (`||` first, `*`/`/`/`%` last before casts).
const BINARY_LEVELS: &[&[TokenKind]] = &[
    &[TokenKind::PipePipe],
    &[TokenKind::AmpAmp],
    &[TokenKind::Pipe],
    &[TokenKind::Caret],
    &[TokenKind::Amp],
    &[TokenKind::EqEq, TokenKind::BangEq],
    &[TokenKind::Lt, TokenKind::Gt, TokenKind::LtEq, TokenKind::GtEq],
    &[TokenKind::LtLt, TokenKind::GtGt],
    &[TokenKind::Plus, TokenKind::Minus],
    &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
];

/// §7 category 5: a token kind listed in `level` (so the caller's
/// `level.contains` guard already passed) that has no operator mapping
/// below is an unreachable grammar state — recorded as a located
/// diagnostic through [`ParseError`] rather than a panic, since every
/// entry `BINARY_LEVELS` actually carries is covered here and this
/// should never surface outside of a corrupted `BINARY_LEVELS` table.
fn binary_operator_at(
    kind: TokenKind,
    level: &[TokenKind],
    offset: usize,
) -> Result<Option<BinaryOperator>, ParseError> {
    if !level.contains(&kind) {
        return Ok(None);
    }
    Ok(Some(match kind {
        TokenKind::PipePipe => BinaryOperator::LogicalOr,
        TokenKind::AmpAmp => BinaryOperator::LogicalAnd,
        TokenKind::Pipe => BinaryOperator::BitwiseOr,
        TokenKind::Caret => BinaryOperator::BitwiseXor,
        TokenKind::Amp => BinaryOperator::BitwiseAnd,
        TokenKind::EqEq => BinaryOperator::Equals,
        TokenKind::BangEq => BinaryOperator::NotEquals,
        TokenKind::Lt => BinaryOperator::Less,
        TokenKind::Gt => BinaryOperator::Greater,
        TokenKind::LtEq => BinaryOperator::LessOrEqual,
        TokenKind::GtEq => BinaryOperator::GreaterOrEqual,
        TokenKind::LtLt => BinaryOperator::ShiftLeft,
        TokenKind::GtGt => BinaryOperator::ShiftRight,
        TokenKind::Plus => BinaryOperator::Plus,
        TokenKind::Minus => BinaryOperator::Minus,
        TokenKind::Star => BinaryOperator::Multiply,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Modulo,
        _ => {
            return Err(ParseError::UnreachableState {
                offset,
                detail: "token kind listed in BINARY_LEVELS has no operator mapping",
            })
        }
    }))
}

fn assignment_operator(kind: TokenKind) -> BinaryOperator {
    match kind {
        TokenKind::Eq => BinaryOperator::Assign,
        TokenKind::StarEq => BinaryOperator::AssignMultiply,
        TokenKind::SlashEq => BinaryOperator::AssignDivide,
        TokenKind::PercentEq => BinaryOperator::AssignModulo,
        TokenKind::PlusEq => BinaryOperator::AssignPlus,
        TokenKind::MinusEq => BinaryOperator::AssignMinus,
        TokenKind::LtLtEq => BinaryOperator::AssignShiftLeft,
        TokenKind::GtGtEq => BinaryOperator::AssignShiftRight,
        TokenKind::AmpEq => BinaryOperator::AssignBitwiseAnd,
        TokenKind::CaretEq => BinaryOperator::AssignBitwiseXor,
        TokenKind::PipeEq => BinaryOperator::AssignBitwiseOr,
        other => unreachable!("{:?} is not an assignment operator", other),
    }
}

fn constant_from_numeric_token(tok: TokenRef<'_>) -> Constant {
    let text = tok.text();
    let base = if text.starts_with("0x") || text.starts_with("0X") {
        IntegerBase::Hexadecimal
    } else if text.len() > 1 && text.starts_with('0') && text.as_bytes()[1].is_ascii_digit() {
        IntegerBase::Octal
    } else {
        IntegerBase::Decimal
    };
    match tok.value() {
        LiteralValue::I32(_) | LiteralValue::U32(_) | LiteralValue::I64(_) | LiteralValue::U64(_) => {
            let (size, unsigned) = match tok.value() {
                LiteralValue::I32(_) => (IntegerSize::Int, false),
                LiteralValue::U32(_) => (IntegerSize::Int, true),
                LiteralValue::I64(_) => (IntegerSize::Long, false),
                LiteralValue::U64(_) => (IntegerSize::Long, true),
                _ => unreachable!(),
            };
            Constant::Integer(Integer {
                base,
                number: text.into(),
                suffix: IntegerSuffix { size, unsigned },
            })
        }
        LiteralValue::Float(_) => Constant::Float(Float {
            base: FloatBase::Decimal,
            number: text.into(),
            suffix: FloatSuffix::Float,
        }),
        LiteralValue::Double(_) => Constant::Float(Float {
            base: FloatBase::Decimal,
            number: text.into(),
            suffix: FloatSuffix::Double,
        }),
        _ => Constant::Integer(Integer {
            base,
            number: text.into(),
            suffix: IntegerSuffix {
                size: IntegerSize::Int,
                unsigned: false,
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr_str(src: &str) -> Node<Expression> {
        let wrapped = format!("void f(void) {{ {}; }}", src);
        let tokens = crate::test_support::lex(&wrapped);
        let (unit, diags) = crate::parser::parse(&wrapped, &tokens, []);
        assert!(diags.is_empty(), "{:?}", diags);
        match &unit.0[0].node {
            ExternalDeclaration::FunctionDefinition(def) => match &def.node.statement.node {
                Statement::Compound(items) => match &items[0].node {
                    BlockItem::Statement(s) => match &s.node {
                        Statement::Expression(Some(expr)) => (**expr).clone(),
                        other => panic!("expected expression statement, got {:?}", other),
                    },
                    other => panic!("expected a statement block item, got {:?}", other),
                },
                other => panic!("expected a compound body, got {:?}", other),
            },
            other => panic!("expected a function definition, got {:?}", other),
        }
    }

    #[test]
    fn assignment_binds_looser_than_additive_and_multiplicative() {
        // `a += 2 * (3 + 4)` must parse as `a += (2 * (3 + 4))`, not
        // `(a += 2) * (3 + 4)`.
        let expr = parse_expr_str("a += 2 * (3 + 4)");
        match expr.node {
            Expression::BinaryOperator(top) => {
                assert_eq!(top.node.operator.node, BinaryOperator::AssignPlus);
                match &top.node.rhs.node {
                    Expression::BinaryOperator(mul) => {
                        assert_eq!(mul.node.operator.node, BinaryOperator::Multiply);
                    }
                    other => panic!("expected a multiplication on the rhs, got {:?}", other),
                }
            }
            other => panic!("expected a top-level assignment, got {:?}", other),
        }
    }

    #[test]
    fn logical_or_binds_looser_than_logical_and() {
        let expr = parse_expr_str("a || b && c");
        match expr.node {
            Expression::BinaryOperator(top) => {
                assert_eq!(top.node.operator.node, BinaryOperator::LogicalOr);
                assert!(matches!(&top.node.rhs.node, Expression::BinaryOperator(b) if b.node.operator.node == BinaryOperator::LogicalAnd));
            }
            other => panic!("expected a top-level logical-or, got {:?}", other),
        }
    }

    #[test]
    fn function_pointer_cast_parses_as_cast_not_call() {
        let expr = parse_expr_str("(int (*)(int))p");
        match expr.node {
            Expression::Cast(cast) => {
                assert!(cast.node.type_name.node.declarator.is_some());
            }
            other => panic!("expected a cast expression, got {:?}", other),
        }
    }

    #[test]
    fn comma_expression_collects_every_operand() {
        let expr = parse_expr_str("a, b, c");
        match expr.node {
            Expression::Comma(items) => assert_eq!(items.len(), 3),
            other => panic!("expected a comma expression, got {:?}", other),
        }
    }
}
