pub mod common;
pub mod expression;

use super::core::{ParseError, Parser};
use crate::ast;
use crate::tokenizer::symbol::{Delimiter, Operator};
use crate::tokenizer::token::{Span, Token, TokenSpan};

/// Brackets plus ternaries the grammar will descend into. Each level costs a deep stack of
/// combinator frames, so this stays small.
pub const MAX_NESTING: usize = 32;

/// Height limit for the parsed tree. Type checking, lowering and evaluation all recurse on it.
pub const MAX_DEPTH: usize = 128;

/// Upper bound on how deep the grammar recurses: open brackets plus every `?` seen so far.
fn nesting(tokens: &[Token]) -> usize {
    let mut open: usize = 0;
    let mut ternaries = 0;
    let mut deepest = 0;
    for token in tokens {
        match token {
            Token::Delimiter(Delimiter::OpenParen | Delimiter::OpenBracket) => open += 1,
            Token::Delimiter(Delimiter::CloseParen | Delimiter::CloseBracket) => {
                open = open.saturating_sub(1)
            }
            Token::Operator(Operator::Question) => ternaries += 1,
            _ => continue,
        }
        deepest = deepest.max(open + ternaries);
    }
    deepest
}

/// Parses a complete expression. Whitespace tokens are skipped and every remaining token must be
/// consumed.
#[tracing::instrument(level = "debug", skip(tokens))]
pub fn parse_tokens(tokens: &[TokenSpan]) -> Result<ast::Expression, ParseError> {
    let (tokens, spans): (Vec<Token>, Vec<Span>) = tokens
        .iter()
        .filter(|span| !span.token.is_trivia())
        .map(|span| (span.token.clone(), span.span()))
        .unzip();

    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    if nesting(&tokens) > MAX_NESTING {
        return Err(ParseError::TooDeep { limit: MAX_NESTING });
    }

    let unexpected = |position: usize| match (tokens.get(position), spans.get(position)) {
        (Some(token), Some(span)) => ParseError::UnexpectedToken {
            found: token.to_string(),
            span: span.clone(),
        },
        _ => ParseError::EOF,
    };

    match expression::parse_expression().parse(&tokens, 0) {
        Ok((pos, expression)) if pos == tokens.len() => {
            if expression.depth() > MAX_DEPTH {
                return Err(ParseError::TooDeep { limit: MAX_DEPTH });
            }
            Ok(expression)
        }
        Ok((pos, _)) => Err(unexpected(pos)),
        Err(e) => Err(match e.position() {
            Some(position) => unexpected(position),
            None => e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::token::Tokenizer;

    fn parse(source: &str) -> Result<ast::Expression, ParseError> {
        parse_tokens(&Tokenizer::new().tokenize(source).unwrap())
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        let error = parse("name age").unwrap_err();
        assert!(matches!(
            error,
            ParseError::UnexpectedToken { ref found, ref span } if found == "age" && span.column == 6
        ));
    }

    #[test]
    fn test_dangling_operator() {
        assert!(matches!(
            parse("age +"),
            Err(ParseError::UnexpectedToken { ref found, .. }) if found == "+"
        ));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("   "), Err(ParseError::EmptyInput));
        assert_eq!(parse_tokens(&[]), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}age{}", "(".repeat(n), ")".repeat(n));
        assert!(parse(&nested(MAX_NESTING)).is_ok());
        assert_eq!(
            parse(&nested(MAX_NESTING + 1)),
            Err(ParseError::TooDeep { limit: MAX_NESTING })
        );
        assert_eq!(
            parse(&nested(5000)),
            Err(ParseError::TooDeep { limit: MAX_NESTING })
        );
        assert_eq!(
            parse(&"[".repeat(400)),
            Err(ParseError::TooDeep { limit: MAX_NESTING })
        );
    }

    #[test]
    fn test_depth_limit() {
        let chain = vec!["age"; MAX_DEPTH + 1].join(" + ");
        assert_eq!(parse(&chain), Err(ParseError::TooDeep { limit: MAX_DEPTH }));
        assert_eq!(
            parse(&format!("{}flag", "!".repeat(MAX_DEPTH))),
            Err(ParseError::TooDeep { limit: MAX_DEPTH })
        );
        assert!(parse(&vec!["age"; 64].join(" + ")).is_ok());
    }

    #[test]
    fn test_unclosed_call() {
        assert!(parse("name.trim(").is_err());
    }
}
