//! Expression grammar, from the loosest binding (ternary) down to primaries.

use super::super::{core::*, prelude::*};
use super::common::*;
use crate::ast::{BinaryOperator, Expression, UnaryOperator};
use crate::tokenizer::{keyword::Keyword, symbol::Operator, token::Token};

static OR: [(Operator, BinaryOperator); 1] = [(Operator::Or, BinaryOperator::Or)];

static AND: [(Operator, BinaryOperator); 1] = [(Operator::And, BinaryOperator::And)];

static COMPARISON: [(Operator, BinaryOperator); 6] = [
    (Operator::EqualEqual, BinaryOperator::Equal),
    (Operator::NotEqual, BinaryOperator::NotEqual),
    (Operator::Greater, BinaryOperator::GreaterThan),
    (Operator::GreaterEqual, BinaryOperator::GreaterThanEqual),
    (Operator::Less, BinaryOperator::LessThan),
    (Operator::LessEqual, BinaryOperator::LessThanEqual),
];

static ADDITIVE: [(Operator, BinaryOperator); 2] = [
    (Operator::Plus, BinaryOperator::Add),
    (Operator::Minus, BinaryOperator::Subtract),
];

static MULTIPLICATIVE: [(Operator, BinaryOperator); 3] = [
    (Operator::Multiply, BinaryOperator::Multiply),
    (Operator::Divide, BinaryOperator::Divide),
    (Operator::Modulo, BinaryOperator::Modulo),
];

static PREFIX: [(Operator, UnaryOperator); 2] = [
    (Operator::Not, UnaryOperator::Not),
    (Operator::Minus, UnaryOperator::Negate),
];

/// Every recursive use of the grammar goes through here. The boxed choice keeps the parser type
/// finite.
pub fn parse_expression() -> impl Parser<Token, Expression> {
    with_context(
        choice(vec![Box::new(lazy(parse_ternary))]),
        "expression",
    )
}

fn parse_ternary() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(
                parse_logical_or(),
                optional(tuple2(
                    preceded(parse_operator(Operator::Question), lazy(parse_expression)),
                    preceded(parse_colon(), lazy(parse_expression)),
                )),
            ),
            |(condition, branches)| match branches {
                Some((then_branch, else_branch)) => Expression::Ternary {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                },
                None => condition,
            },
        ),
        "ternary",
    )
}

fn fold_binary(first: Expression, rest: Vec<(BinaryOperator, Expression)>) -> Expression {
    rest.into_iter()
        .fold(first, |left, (op, right)| Expression::binary(op, left, right))
}

fn parse_logical_or() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(
                parse_logical_and(),
                many(tuple2(parse_operator_from(&OR), parse_logical_and())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "logical or",
    )
}

fn parse_logical_and() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(
                parse_comparison(),
                many(tuple2(parse_operator_from(&AND), parse_comparison())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "logical and",
    )
}

fn parse_comparison() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(
                parse_additive(),
                many(tuple2(parse_operator_from(&COMPARISON), parse_additive())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "comparison",
    )
}

fn parse_additive() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(
                parse_multiplicative(),
                many(tuple2(
                    parse_operator_from(&ADDITIVE),
                    parse_multiplicative(),
                )),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "additive",
    )
}

fn parse_multiplicative() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(
                parse_unary(),
                many(tuple2(parse_operator_from(&MULTIPLICATIVE), parse_unary())),
            ),
            |(first, rest)| fold_binary(first, rest),
        ),
        "multiplicative",
    )
}

/// Prefix operators apply right to left: `!-x` is `!(-x)`.
fn parse_unary() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(many(parse_operator_from(&PREFIX)), parse_postfix()),
            |(operators, operand)| {
                operators
                    .into_iter()
                    .rev()
                    .fold(operand, |operand, op| Expression::UnaryOp {
                        op,
                        operand: Box::new(operand),
                    })
            },
        ),
        "unary",
    )
}

enum Postfix {
    Member(String),
    Call(String, Vec<Expression>),
    Index(Expression),
    Class,
}

fn parse_arguments() -> impl Parser<Token, Vec<Expression>> {
    with_context(
        delimited(
            parse_open_paren(),
            separated_list(lazy(parse_expression), parse_comma()),
            parse_close_paren(),
        ),
        "arguments",
    )
}

fn parse_postfix_operator() -> impl Parser<Token, Postfix> {
    choice(vec![
        Box::new(map(
            preceded(parse_dot(), tuple2(parse_identifier(), parse_arguments())),
            |(method, arguments)| Postfix::Call(method, arguments),
        )),
        Box::new(map(preceded(parse_dot(), parse_identifier()), Postfix::Member)),
        Box::new(map(
            preceded(parse_dot(), parse_keyword(Keyword::Class)),
            |_| Postfix::Class,
        )),
        Box::new(map(
            delimited(
                parse_open_bracket(),
                lazy(parse_expression),
                parse_close_bracket(),
            ),
            Postfix::Index,
        )),
    ])
}

fn apply_postfix(target: Expression, postfix: Postfix) -> Result<Expression, String> {
    Ok(match postfix {
        Postfix::Member(name) => Expression::property(target, name),
        Postfix::Call(method, arguments) => Expression::MethodCall {
            target: Some(Box::new(target)),
            method,
            arguments,
        },
        Postfix::Index(index) => Expression::Index {
            target: Box::new(target),
            index: Box::new(index),
        },
        Postfix::Class => match target.dotted_name() {
            Some(name) => Expression::ClassLiteral(name),
            None => return Err("`.class` must follow a type name".to_string()),
        },
    })
}

fn parse_postfix() -> impl Parser<Token, Expression> {
    with_context(
        map_res(
            tuple2(parse_primary(), many(parse_postfix_operator())),
            |(primary, postfixes)| postfixes.into_iter().try_fold(primary, apply_postfix),
        ),
        "postfix",
    )
}

fn parse_primary() -> impl Parser<Token, Expression> {
    with_context(
        choice(vec![
            Box::new(map(parse_literal(), Expression::Literal)),
            Box::new(map(parse_keyword(Keyword::This), |_| Expression::This)),
            Box::new(parse_bare_call()),
            Box::new(map(parse_identifier(), Expression::Variable)),
            Box::new(delimited(
                parse_open_paren(),
                lazy(parse_expression),
                parse_close_paren(),
            )),
            Box::new(parse_list()),
        ]),
        "primary",
    )
}

fn parse_bare_call() -> impl Parser<Token, Expression> {
    with_context(
        map(
            tuple2(parse_identifier(), parse_arguments()),
            |(method, arguments)| Expression::MethodCall {
                target: None,
                method,
                arguments,
            },
        ),
        "method call",
    )
}

fn parse_list() -> impl Parser<Token, Expression> {
    with_context(
        map(
            delimited(
                parse_open_bracket(),
                separated_list(lazy(parse_expression), parse_comma()),
                parse_close_bracket(),
            ),
            Expression::List,
        ),
        "list",
    )
}
