//! Abstract syntax tree for a single C translation unit.
//!
//! Node shapes mostly follow the C99 grammar's own naming; GNU/MSVC
//! vendor extensions, `_Generic`, `_Atomic`, `typeof`, `offsetof`,
//! `va_arg` expansions, inline assembly and static assertions are
//! deliberately absent — they are outside this parser's "C99-ish
//! subset" scope (`spec.md` §1).
//!
//! Every node owns its children exclusively; the tree has no sharing
//! and no cycles (§3, "Lifecycle").

use crate::span::Node;

// 6.4 Lexical elements

/// Variable, function, struct/enum tag, and other names that are not
/// type names (typedef names get their own `TypeSpecifier` variant).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Integer(Integer),
    Float(Float),
    Character(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Integer {
    pub base: IntegerBase,
    pub number: Box<str>,
    pub suffix: IntegerSuffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerBase {
    Decimal,
    Octal,
    Hexadecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerSuffix {
    pub size: IntegerSize,
    pub unsigned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntegerSize {
    Int = 0,
    Long,
    LongLong,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Float {
    pub base: FloatBase,
    pub number: Box<str>,
    pub suffix: FloatSuffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatBase {
    Decimal,
    Hexadecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatSuffix {
    Float,
    Double,
    LongDouble,
}

/// A (possibly adjacent-concatenated) string literal; each element is
/// one source token's decoded text.
pub type StringLiteral = Vec<String>;

// 6.5 Expressions

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Box<Node<Identifier>>),
    Constant(Box<Node<Constant>>),
    StringLiteral(Box<Node<StringLiteral>>),
    /// Struct/union member access, both `.` and `->` (§4.8 Postfix).
    Member(Box<Node<MemberExpression>>),
    Call(Box<Node<CallExpression>>),
    CompoundLiteral(Box<Node<CompoundLiteral>>),
    /// `sizeof ( type-name )`. `sizeof expr` is
    /// `UnaryOperator::SizeOf` applied to the operand instead.
    SizeOfType(Box<Node<TypeName>>),
    UnaryOperator(Box<Node<UnaryOperatorExpression>>),
    Cast(Box<Node<CastExpression>>),
    /// Covers every binary and assignment operator in §4.8's
    /// precedence table — assignment is just another binary operator
    /// here, right-associative, folded in alongside `+`, `==`, etc.
    BinaryOperator(Box<Node<BinaryOperatorExpression>>),
    Conditional(Box<Node<ConditionalExpression>>),
    Comma(Box<Vec<Node<Expression>>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberOperator {
    /// `expression.identifier`
    Direct,
    /// `expression->identifier`
    Indirect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub operator: Node<MemberOperator>,
    pub expression: Box<Node<Expression>>,
    pub identifier: Node<Identifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Node<Expression>>,
    pub arguments: Vec<Node<Expression>>,
}

/// `( type-name ) { initializer-list }` — a C99 unnamed object.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundLiteral {
    pub type_name: Node<TypeName>,
    pub initializer_list: Vec<Node<InitializerListItem>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    PostIncrement,
    PostDecrement,
    PreIncrement,
    PreDecrement,
    Address,
    Indirection,
    Plus,
    Minus,
    Complement,
    Negate,
    SizeOf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperatorExpression {
    pub operator: Node<UnaryOperator>,
    pub operand: Box<Node<Expression>>,
}

/// `( type-name ) expr`
#[derive(Debug, Clone, PartialEq)]
pub struct CastExpression {
    pub type_name: Node<TypeName>,
    pub expression: Box<Node<Expression>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Index,
    Multiply,
    Divide,
    Modulo,
    Plus,
    Minus,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Equals,
    NotEquals,
    BitwiseAnd,
    BitwiseXor,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
    Assign,
    AssignMultiply,
    AssignDivide,
    AssignModulo,
    AssignPlus,
    AssignMinus,
    AssignShiftLeft,
    AssignShiftRight,
    AssignBitwiseAnd,
    AssignBitwiseXor,
    AssignBitwiseOr,
}

impl BinaryOperator {
    pub fn is_assignment(self) -> bool {
        use BinaryOperator::*;
        matches!(
            self,
            Assign
                | AssignMultiply
                | AssignDivide
                | AssignModulo
                | AssignPlus
                | AssignMinus
                | AssignShiftLeft
                | AssignShiftRight
                | AssignBitwiseAnd
                | AssignBitwiseXor
                | AssignBitwiseOr
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperatorExpression {
    pub operator: Node<BinaryOperator>,
    pub lhs: Box<Node<Expression>>,
    pub rhs: Box<Node<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub condition: Box<Node<Expression>>,
    pub then_expression: Box<Node<Expression>>,
    pub else_expression: Box<Node<Expression>>,
}

// 6.7 Declarations

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub specifiers: Vec<Node<DeclarationSpecifier>>,
    pub declarators: Vec<Node<InitDeclarator>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationSpecifier {
    StorageClass(Node<StorageClassSpecifier>),
    TypeSpecifier(Node<TypeSpecifier>),
    TypeQualifier(Node<TypeQualifier>),
    Function(Node<FunctionSpecifier>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitDeclarator {
    pub declarator: Node<Declarator>,
    pub initializer: Option<Node<Initializer>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClassSpecifier {
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeQualifier {
    Const,
    Restrict,
    Volatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionSpecifier {
    Inline,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpecifier {
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,
    Bool,
    Struct(Node<StructType>),
    Enum(Node<EnumType>),
    TypedefName(Node<Identifier>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub kind: StructKind,
    pub identifier: Option<Node<Identifier>>,
    pub declarations: Option<Vec<Node<StructDeclaration>>>,
}

/// The only difference between a `struct` and a `union` is which
/// keyword was actually consumed — see `DESIGN.md` for the bug this
/// corrects relative to the code this parser was modeled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    Struct,
    Union,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDeclaration {
    pub specifiers: Vec<Node<SpecifierQualifier>>,
    pub declarators: Vec<Node<StructDeclarator>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpecifierQualifier {
    TypeSpecifier(Node<TypeSpecifier>),
    TypeQualifier(Node<TypeQualifier>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDeclarator {
    pub declarator: Option<Node<Declarator>>,
    pub bit_width: Option<Box<Node<Expression>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub identifier: Option<Node<Identifier>>,
    pub enumerators: Vec<Node<Enumerator>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumerator {
    pub identifier: Node<Identifier>,
    pub expression: Option<Box<Node<Expression>>>,
}

// 6.7.6 Declarators

/// Single item in a declaration: either a concrete declarator (names
/// something) or an abstract one (names nothing, only used in
/// parameter lists and type names). `derived` is the flattened,
/// left-to-right chain of pointer/array/function suffixes — exactly
/// the order they appeared in source, which is what makes e.g.
/// `int *a[3]` ("array of pointer") vs `int (*a)[3]` ("pointer to
/// array") fall out of the chain's order rather than needing a
/// separate tree shape for each.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub kind: Node<DeclaratorKind>,
    pub derived: Vec<Node<DerivedDeclarator>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclaratorKind {
    /// Unnamed declarator, e.g. inside a prototype's parameter list.
    Abstract,
    Identifier(Node<Identifier>),
    /// Any parenthesised group inside a declarator, e.g. a pointer to
    /// a function.
    Declarator(Box<Node<Declarator>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DerivedDeclarator {
    Pointer(Vec<Node<TypeQualifier>>),
    Array(Node<ArrayDeclarator>),
    Function(Node<FunctionDeclarator>),
    /// Old-style (K&R) parameter name list, e.g. `f(a, b)`.
    KRFunction(Vec<Node<Identifier>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDeclarator {
    pub qualifiers: Vec<Node<TypeQualifier>>,
    pub size: ArraySize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclarator {
    pub parameters: Vec<Node<ParameterDeclaration>>,
    pub ellipsis: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArraySize {
    /// `[]`
    Unknown,
    /// `[*]`
    VlaUnspecified,
    /// `[10]`
    VariableExpression(Box<Node<Expression>>),
    /// `[static 10]`
    StaticExpression(Box<Node<Expression>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclaration {
    pub specifiers: Vec<Node<DeclarationSpecifier>>,
    /// `None` for a bare `void` parameter in `f(void)`.
    pub declarator: Option<Node<Declarator>>,
}

// 6.7.7 Type names

/// A type referenced outside of a declaration — the operand of a
/// cast, `sizeof`, or compound literal. Contains only an abstract
/// declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    pub specifiers: Vec<Node<SpecifierQualifier>>,
    pub declarator: Option<Node<Declarator>>,
}

// 6.7.9 Initialization

#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Expression(Box<Node<Expression>>),
    List(Vec<Node<InitializerListItem>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitializerListItem {
    pub designation: Vec<Node<Designator>>,
    pub initializer: Box<Node<Initializer>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Designator {
    /// `{ [expression] = … }`
    Index(Node<Expression>),
    /// `{ .identifier = … }`
    Member(Node<Identifier>),
}

// 6.8 Statements

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Labeled(Node<LabeledStatement>),
    Compound(Vec<Node<BlockItem>>),
    Expression(Option<Box<Node<Expression>>>),
    If(Node<IfStatement>),
    Switch(Node<SwitchStatement>),
    While(Node<WhileStatement>),
    DoWhile(Node<DoWhileStatement>),
    For(Node<ForStatement>),
    Goto(Node<Identifier>),
    Continue,
    Break,
    Return(Option<Box<Node<Expression>>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStatement {
    pub label: Node<Label>,
    pub statement: Box<Node<Statement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Box<Node<Expression>>,
    pub then_statement: Box<Node<Statement>>,
    pub else_statement: Option<Box<Node<Statement>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    pub expression: Box<Node<Expression>>,
    pub statement: Box<Node<Statement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub expression: Box<Node<Expression>>,
    pub statement: Box<Node<Statement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatement {
    pub statement: Box<Node<Statement>>,
    pub expression: Box<Node<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub initializer: Node<ForInitializer>,
    pub condition: Option<Box<Node<Expression>>>,
    pub step: Option<Box<Node<Expression>>>,
    pub statement: Box<Node<Statement>>,
}

/// `goto`/`case`/`default` targets, recorded verbatim; the parser
/// performs no validation of them (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Identifier(Node<Identifier>),
    Case(Box<Node<Expression>>),
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInitializer {
    Empty,
    Expression(Box<Node<Expression>>),
    Declaration(Node<Declaration>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockItem {
    Declaration(Node<Declaration>),
    Statement(Node<Statement>),
}

// 6.9 External definitions

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit(pub Vec<Node<ExternalDeclaration>>);

#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDeclaration {
    Declaration(Node<Declaration>),
    FunctionDefinition(Node<FunctionDefinition>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub specifiers: Vec<Node<DeclarationSpecifier>>,
    pub declarator: Node<Declarator>,
    /// Old-style (K&R) parameter type definitions between the
    /// parameter-name list and the opening `{` (§4.7's "Non-goals"
    /// still lets the grammar recognise these; see `DESIGN.md`).
    pub declarations: Vec<Node<Declaration>>,
    pub statement: Node<Statement>,
}
