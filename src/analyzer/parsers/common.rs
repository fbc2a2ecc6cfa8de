use super::super::{core::*, prelude::*};
use crate::ast;
use crate::tokenizer::{
    keyword::Keyword,
    literal::Literal,
    symbol::{Delimiter, Operator},
    token::Token,
};

pub fn parse_identifier() -> impl Parser<Token, String> {
    with_context(
        satisfy(|token: &Token| match token {
            Token::Identifier(s) => Some(s.clone()),
            _ => None,
        }),
        "identifier",
    )
}

pub fn parse_literal() -> impl Parser<Token, ast::Literal> {
    with_context(
        satisfy(|token: &Token| match token {
            Token::Literal(Literal::Integer(i)) => Some(ast::Literal::Integer(*i)),
            Token::Literal(Literal::Float(x)) => Some(ast::Literal::Float(*x)),
            Token::Literal(Literal::Text(s)) => Some(ast::Literal::Text(s.clone())),
            Token::Keyword(Keyword::True) => Some(ast::Literal::Boolean(true)),
            Token::Keyword(Keyword::False) => Some(ast::Literal::Boolean(false)),
            Token::Keyword(Keyword::Null) => Some(ast::Literal::Null),
            _ => None,
        }),
        "literal",
    )
}

pub fn parse_keyword(keyword: Keyword) -> impl Parser<Token, ()> {
    as_unit(equal(Token::Keyword(keyword)))
}

pub fn parse_operator(operator: Operator) -> impl Parser<Token, ()> {
    as_unit(equal(Token::Operator(operator)))
}

pub fn parse_dot() -> impl Parser<Token, ()> {
    parse_operator(Operator::Dot)
}

pub fn parse_comma() -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(Delimiter::Comma)))
}

pub fn parse_colon() -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(Delimiter::Colon)))
}

pub fn parse_open_paren() -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(Delimiter::OpenParen)))
}

pub fn parse_close_paren() -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(Delimiter::CloseParen)))
}

pub fn parse_open_bracket() -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(Delimiter::OpenBracket)))
}

pub fn parse_close_bracket() -> impl Parser<Token, ()> {
    as_unit(equal(Token::Delimiter(Delimiter::CloseBracket)))
}

/// Matches any operator listed in `table`, yielding its paired value.
pub fn parse_operator_from<T: Copy + 'static>(
    table: &'static [(Operator, T)],
) -> impl Parser<Token, T> {
    satisfy(move |token: &Token| match token {
        Token::Operator(operator) => table
            .iter()
            .find(|(candidate, _)| candidate == operator)
            .map(|(_, value)| *value),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_tokens() {
        let input = vec![
            Token::Literal(Literal::Integer(3)),
            Token::Keyword(Keyword::Null),
            Token::Identifier("x".to_string()),
        ];
        assert_eq!(
            parse_literal().parse(&input, 0),
            Ok((1, ast::Literal::Integer(3)))
        );
        assert_eq!(parse_literal().parse(&input, 1), Ok((2, ast::Literal::Null)));
        assert!(parse_literal().parse(&input, 2).is_err());
        assert_eq!(parse_identifier().parse(&input, 2), Ok((3, "x".to_string())));
    }

    #[test]
    fn test_operator_table() {
        static TABLE: [(Operator, ast::BinaryOperator); 2] = [
            (Operator::Plus, ast::BinaryOperator::Add),
            (Operator::Minus, ast::BinaryOperator::Subtract),
        ];
        let input = vec![Token::Operator(Operator::Minus), Token::Operator(Operator::Dot)];
        let parser = parse_operator_from(&TABLE);
        assert_eq!(parser.parse(&input, 0), Ok((1, ast::BinaryOperator::Subtract)));
        assert!(parser.parse(&input, 1).is_err());
    }
}
