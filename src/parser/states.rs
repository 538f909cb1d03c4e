//! Parser state table.
//!
//! Each state lists the token kinds it accepts and where each one leads,
//! whether input may legally end there, and, for delegating states, the
//! tokens that close the nested sub-expression.

use crate::ast::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    ExpectOperand,
    ExpectBinOp,
    ExpectTransform,
    PostTransform,
    /// After a `.` that extends a namespaced transform name
    TransformName,
    PostArgs,
    Identifier,
    Traverse,
    ExpectObjKey,
    ExpectKeyValSep,
    Filter,
    SubExpression,
    ArgVal,
    ObjVal,
    ArrayVal,
    TernaryMid,
    TernaryEnd,
    Complete,
}

/// Token that ends a sub-expression, and the state the owner moves to.
pub type EndState = (TokenKind, State);

impl State {
    /// Next state for a token accepted directly by this state.
    pub fn next(self, kind: TokenKind) -> Option<State> {
        use State::*;
        use TokenKind as T;
        match (self, kind) {
            (ExpectOperand, T::Literal) => Some(ExpectBinOp),
            (ExpectOperand, T::Identifier) => Some(Identifier),
            (ExpectOperand, T::UnaryOp) => Some(ExpectOperand),
            (ExpectOperand, T::OpenParen) => Some(SubExpression),
            (ExpectOperand, T::OpenCurl) => Some(ExpectObjKey),
            (ExpectOperand, T::OpenBracket) => Some(ArrayVal),
            (ExpectOperand, T::Dot) => Some(Traverse),

            (ExpectBinOp | Identifier | PostTransform | PostArgs, T::BinaryOp) => Some(ExpectOperand),
            (ExpectBinOp | Identifier | PostTransform | PostArgs, T::Pipe) => Some(ExpectTransform),
            (ExpectBinOp | Identifier | PostTransform | PostArgs, T::Dot) => Some(Traverse),
            (ExpectBinOp | Identifier | PostTransform | PostArgs, T::OpenBracket) => Some(Filter),
            (ExpectBinOp | Identifier | PostTransform | PostArgs, T::Question) => Some(TernaryMid),

            (ExpectTransform, T::Identifier) => Some(PostTransform),
            (PostTransform, T::OpenParen) => Some(ArgVal),
            (TransformName, T::Identifier) => Some(PostTransform),

            (Identifier, T::OpenParen) => Some(ArgVal),
            (Traverse, T::Identifier) => Some(Identifier),

            (ExpectObjKey, T::Identifier | T::Literal) => Some(ExpectKeyValSep),
            (ExpectObjKey, T::CloseCurl) => Some(ExpectBinOp),
            (ExpectKeyValSep, T::Colon) => Some(ObjVal),

            _ => None,
        }
    }

    /// Whether input may end in this state.
    pub fn is_completable(self) -> bool {
        matches!(
            self,
            State::ExpectBinOp
                | State::PostTransform
                | State::PostArgs
                | State::Identifier
                | State::TernaryEnd
                | State::Complete
        )
    }

    /// Whether tokens in this state are forwarded to a nested parser.
    pub fn delegates(self) -> bool {
        matches!(
            self,
            State::Filter
                | State::SubExpression
                | State::ArgVal
                | State::ObjVal
                | State::ArrayVal
                | State::TernaryMid
                | State::TernaryEnd
        )
    }

    /// Tokens that close the nested parser of a delegating state.
    ///
    /// `TernaryEnd` has none of its own: its nested parser inherits the
    /// owner's end tokens.
    pub fn end_states(self) -> Option<&'static [EndState]> {
        use State::*;
        use TokenKind as T;
        match self {
            Filter => Some(&[(T::CloseBracket, Identifier)]),
            SubExpression => Some(&[(T::CloseParen, ExpectBinOp)]),
            ArgVal => Some(&[(T::Comma, ArgVal), (T::CloseParen, PostArgs)]),
            ObjVal => Some(&[(T::Comma, ExpectObjKey), (T::CloseCurl, ExpectBinOp)]),
            ArrayVal => Some(&[(T::Comma, ArrayVal), (T::CloseBracket, ExpectBinOp)]),
            TernaryMid => Some(&[(T::Colon, TernaryEnd)]),
            _ => None,
        }
    }
}
