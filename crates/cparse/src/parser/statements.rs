//! §4.7: statements, blocks, and the translation of "is this a
//! declaration or a statement?" at block-item granularity.

use super::Parser;
use crate::ast::*;
use crate::span::Node;
use crate::token::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_compound_statement_inner(&mut self) -> Option<Node<Statement>> {
        let start = self.view.span();
        self.expect(TokenKind::LBrace, "'{'");
        let mut items = Vec::new();
        while self.view.kind() != TokenKind::RBrace && !self.view.is_at_end() {
            match self.parse_block_item() {
                Some(item) => items.push(item),
                None => self.resynchronize(),
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Some(Node::new(Statement::Compound(items), self.view.span().join(start)))
    }

    /// Pushes a scope, parses a compound statement, pops the scope
    /// (§4.7). Used everywhere a `{ ... }` appears except a function
    /// body, which instead reuses the scope already pushed for its
    /// parameters (§4.3).
    fn parse_compound_statement(&mut self) -> Option<Node<Statement>> {
        self.env.enter();
        let result = self.parse_compound_statement_inner();
        self.env.leave();
        result
    }

    fn parse_block_item(&mut self) -> Option<Node<BlockItem>> {
        if self.declaration_specifiers_first() {
            let decl = self.parse_declaration()?;
            let span = decl.span;
            Some(Node::new(BlockItem::Declaration(decl), span))
        } else {
            let stmt = self.parse_statement()?;
            let span = stmt.span;
            Some(Node::new(BlockItem::Statement(stmt), span))
        }
    }

    pub(crate) fn parse_statement(&mut self) -> Option<Node<Statement>> {
        let start = self.view.span();
        match self.view.kind() {
            TokenKind::LBrace => self.parse_compound_statement(),
            TokenKind::Case => {
                self.view.advance();
                let expr = self.parse_conditional_expression()?;
                self.expect(TokenKind::Colon, "':'");
                let body = self.parse_statement()?;
                let label = Node::new(Label::Case(Box::new(expr)), start);
                Some(Node::new(
                    Statement::Labeled(Node::new(
                        LabeledStatement {
                            label,
                            statement: Box::new(body),
                        },
                        self.view.span().join(start),
                    )),
                    self.view.span().join(start),
                ))
            }
            TokenKind::Default => {
                self.view.advance();
                self.expect(TokenKind::Colon, "':'");
                let body = self.parse_statement()?;
                let label = Node::new(Label::Default, start);
                Some(Node::new(
                    Statement::Labeled(Node::new(
                        LabeledStatement {
                            label,
                            statement: Box::new(body),
                        },
                        self.view.span().join(start),
                    )),
                    self.view.span().join(start),
                ))
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Switch => {
                self.view.advance();
                self.expect(TokenKind::LParen, "'('");
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'");
                let body = self.parse_statement()?;
                Some(Node::new(
                    Statement::Switch(Node::new(
                        SwitchStatement {
                            expression: Box::new(expr),
                            statement: Box::new(body),
                        },
                        self.view.span().join(start),
                    )),
                    self.view.span().join(start),
                ))
            }
            TokenKind::While => {
                self.view.advance();
                self.expect(TokenKind::LParen, "'('");
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'");
                let body = self.parse_statement()?;
                Some(Node::new(
                    Statement::While(Node::new(
                        WhileStatement {
                            expression: Box::new(expr),
                            statement: Box::new(body),
                        },
                        self.view.span().join(start),
                    )),
                    self.view.span().join(start),
                ))
            }
            TokenKind::Do => {
                self.view.advance();
                let body = self.parse_statement()?;
                self.expect(TokenKind::While, "'while'");
                self.expect(TokenKind::LParen, "'('");
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'");
                self.expect(TokenKind::Semi, "';'");
                Some(Node::new(
                    Statement::DoWhile(Node::new(
                        DoWhileStatement {
                            statement: Box::new(body),
                            expression: Box::new(expr),
                        },
                        self.view.span().join(start),
                    )),
                    self.view.span().join(start),
                ))
            }
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Goto => {
                self.view.advance();
                if self.view.kind() != TokenKind::Identifier {
                    self.error_expected("a label name");
                    return None;
                }
                let name = self.view.current().text().to_owned();
                let span = self.view.span();
                self.view.advance();
                self.expect(TokenKind::Semi, "';'");
                Some(Node::new(
                    Statement::Goto(Node::new(Identifier { name }, span)),
                    self.view.span().join(start),
                ))
            }
            TokenKind::Continue => {
                self.view.advance();
                self.expect(TokenKind::Semi, "';'");
                Some(Node::new(Statement::Continue, self.view.span().join(start)))
            }
            TokenKind::Break => {
                self.view.advance();
                self.expect(TokenKind::Semi, "';'");
                Some(Node::new(Statement::Break, self.view.span().join(start)))
            }
            TokenKind::Return => {
                self.view.advance();
                let expr = if self.view.kind() == TokenKind::Semi {
                    None
                } else {
                    Some(Box::new(self.parse_expression()?))
                };
                self.expect(TokenKind::Semi, "';'");
                Some(Node::new(Statement::Return(expr), self.view.span().join(start)))
            }
            TokenKind::Semi => {
                self.view.advance();
                Some(Node::new(Statement::Expression(None), self.view.span().join(start)))
            }
            TokenKind::Identifier if self.view.kind_at(1) == TokenKind::Colon => {
                self.parse_labelled_statement()
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semi, "';'");
                Some(Node::new(
                    Statement::Expression(Some(Box::new(expr))),
                    self.view.span().join(start),
                ))
            }
        }
    }

    /// §4.7: speculatively consume `identifier :`; a real
    /// `(LBrace, Identifier, Colon)` peek sequence is enough here
    /// (the grammar only needs one token of lookahead past the
    /// identifier), but the mark/reset pair matches the spec's
    /// description of this production as a backtracking point and
    /// keeps it resilient if that peek distance ever changes.
    fn parse_labelled_statement(&mut self) -> Option<Node<Statement>> {
        let start = self.view.span();
        let mark = self.view.mark();
        if self.view.kind() != TokenKind::Identifier {
            self.view.reset(mark);
            self.error_expected("a label");
            return None;
        }
        let name = self.view.current().text().to_owned();
        let ident_span = self.view.span();
        self.view.advance();
        if !self.view.eat(TokenKind::Colon) {
            self.view.reset(mark);
            let expr = self.parse_expression()?;
            self.expect(TokenKind::Semi, "';'");
            return Some(Node::new(
                Statement::Expression(Some(Box::new(expr))),
                self.view.span().join(start),
            ));
        }
        let body = self.parse_statement()?;
        Some(Node::new(
            Statement::Labeled(Node::new(
                LabeledStatement {
                    label: Node::new(Label::Identifier(Node::new(Identifier { name }, ident_span)), ident_span),
                    statement: Box::new(body),
                },
                self.view.span().join(start),
            )),
            self.view.span().join(start),
        ))
    }

    fn parse_if_statement(&mut self) -> Option<Node<Statement>> {
        let start = self.view.span();
        self.view.advance();
        self.expect(TokenKind::LParen, "'('");
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'");
        let then_statement = self.parse_statement()?;
        let else_statement = if self.view.eat(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Some(Node::new(
            Statement::If(Node::new(
                IfStatement {
                    condition: Box::new(condition),
                    then_statement: Box::new(then_statement),
                    else_statement,
                },
                self.view.span().join(start),
            )),
            self.view.span().join(start),
        ))
    }

    fn parse_for_statement(&mut self) -> Option<Node<Statement>> {
        let start = self.view.span();
        self.view.advance();
        self.expect(TokenKind::LParen, "'('");

        // `for` introduces its own scope so a declaration in the init
        // clause is only visible to the loop. `self.env.leave()` must
        // run even if one of the fallible sub-parses below misses, so
        // the body is collected into a plain `Option` first and only
        // unwrapped with `?` after the scope is popped again (§8,
        // "scope balance").
        self.env.enter();
        let parsed = (|| -> Option<(Node<ForInitializer>, Option<Box<Node<Expression>>>, Option<Box<Node<Expression>>>, Node<Statement>)> {
            let init_start = self.view.span();
            let initializer = if self.view.eat(TokenKind::Semi) {
                Node::new(ForInitializer::Empty, init_start)
            } else if self.declaration_specifiers_first() {
                let decl = self.parse_declaration()?;
                let span = decl.span;
                Node::new(ForInitializer::Declaration(decl), span)
            } else {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semi, "';'");
                let span = expr.span;
                Node::new(ForInitializer::Expression(Box::new(expr)), span)
            };

            let condition = if self.view.kind() == TokenKind::Semi {
                None
            } else {
                Some(Box::new(self.parse_expression()?))
            };
            self.expect(TokenKind::Semi, "';'");

            let step = if self.view.kind() == TokenKind::RParen {
                None
            } else {
                Some(Box::new(self.parse_expression()?))
            };
            self.expect(TokenKind::RParen, "')'");

            let body = self.parse_statement()?;
            Some((initializer, condition, step, body))
        })();
        self.env.leave();
        let (initializer, condition, step, body) = parsed?;

        Some(Node::new(
            Statement::For(Node::new(
                ForStatement {
                    initializer,
                    condition,
                    step,
                    statement: Box::new(body),
                },
                self.view.span().join(start),
            )),
            self.view.span().join(start),
        ))
    }
}
