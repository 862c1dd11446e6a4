use crate::error_handling::{Result, SyntaxError};
use crate::scanning::*;
use crate::values::Number;
use std::fmt;
use std::str::FromStr;

pub type ParseResult<T> = std::result::Result<T, SyntaxError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    negative,
    positive,
}

impl UnaryOperator {
    pub fn call(&self, value: Number) -> Result<Number> {
        use UnaryOperator::*;
        match self {
            positive => Ok(value),
            negative => value.negate(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidOperator;

impl FromStr for UnaryOperator {
    type Err = InvalidOperator;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use UnaryOperator::*;
        match s {
            "+" => Ok(positive),
            "-" => Ok(negative),
            _ => Err(InvalidOperator),
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::positive => f.write_str("+"),
            UnaryOperator::negative => f.write_str("-"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    addition,
    subtraction,
    multiplication,
    division,
    floor_division,
    modulo,
    exponentiation,
}

impl BinaryOperator {
    pub fn call(&self, left: Number, right: Number) -> Result<Number> {
        use BinaryOperator::*;

        match self {
            addition => left.add(right),
            subtraction => left.subtract(right),
            multiplication => left.multiply(right),
            division => left.divide(right),
            floor_division => left.floor_divide(right),
            modulo => left.modulo(right),
            exponentiation => left.power(right),
        }
    }
}

impl FromStr for BinaryOperator {
    type Err = InvalidOperator;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use BinaryOperator::*;
        match s {
            "+" => Ok(addition),
            "-" => Ok(subtraction),
            "*" => Ok(multiplication),
            "/" => Ok(division),
            "//" => Ok(floor_division),
            "%" => Ok(modulo),
            "^" | "**" => Ok(exponentiation),
            _ => Err(InvalidOperator),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOperator::*;
        f.write_str(match self {
            addition => "+",
            subtraction => "-",
            multiplication => "*",
            division => "/",
            floor_division => "//",
            modulo => "%",
            exponentiation => "**",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    unary(UnaryOperator),
    binary(BinaryOperator),
}

pub enum Punctuation {
    paren,
    /// An open call; `base` is where its arguments start on the output.
    call { name: String, base: usize },
}

pub enum StackNode {
    operator(Operator),
    punctuation(Punctuation),
}

impl StackNode {
    fn precedence(&self) -> i32 {
        use BinaryOperator::*;
        use Operator::*;
        match self {
            Self::punctuation(_) => 0,
            Self::operator(binary(operator)) =>
                match operator {
                    addition | subtraction => 1,
                    multiplication | division | floor_division | modulo => 2,
                    exponentiation => 4,
                },
            Self::operator(unary(_)) => 3,
        }
    }
}

/// The parsed form of one expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprNode {
    literal(Number),
    identifier(String),
    unary { operator: UnaryOperator, operand: Box<ExprNode> },
    binary { operator: BinaryOperator, left: Box<ExprNode>, right: Box<ExprNode> },
    call { name: String, arguments: Vec<ExprNode> },
}

/// Deepest tree the parser builds. Evaluating and dropping a tree both
/// recurse once per level.
pub const MAX_DEPTH: usize = 500;

/// Shunting-yard state. Operators wait on `stack`; finished subtrees
/// accumulate on `expression`, paired with their depth, until an operator
/// claims them.
pub struct Yard {
    expression: Vec<(ExprNode, usize)>,
    stack: Vec<StackNode>,
}

impl Default for Yard {
    fn default() -> Self {
        Self::new()
    }
}

impl Yard {
    pub fn new() -> Self {
        Self{expression: Vec::new(), stack: Vec::new()}
    }

    pub fn is_empty(&self) -> bool {
        self.expression.is_empty() && self.stack.is_empty()
    }

    fn push_operand(&mut self, node: ExprNode, depth: usize) -> ParseResult<()> {
        if depth > MAX_DEPTH {
            return Err(SyntaxError::too_deep(MAX_DEPTH));
        }
        self.expression.push((node, depth));
        Ok(())
    }

    fn add_number(&mut self, content: &str) -> ParseResult<()> {
        let number = Number::from_literal(content).ok_or_else(|| SyntaxError::invalid_number(content.into()))?;
        self.push_operand(ExprNode::literal(number), 1)
    }

    fn add_identifier(&mut self, name: &str) -> ParseResult<()> {
        self.push_operand(ExprNode::identifier(name.into()), 1)
    }

    fn pop_operand(&mut self) -> ParseResult<(Box<ExprNode>, usize)> {
        self.expression
            .pop()
            .map(|(node, depth)| (Box::new(node), depth))
            .ok_or(SyntaxError::abrupt_end)
    }

    fn reduce(&mut self, operator: Operator) -> ParseResult<()> {
        match operator {
            Operator::unary(operator) => {
                let (operand, depth) = self.pop_operand()?;
                self.push_operand(ExprNode::unary{operator, operand}, depth + 1)
            },
            Operator::binary(operator) => {
                let (right, right_depth) = self.pop_operand()?;
                let (left, left_depth) = self.pop_operand()?;
                self.push_operand(ExprNode::binary{operator, left, right}, left_depth.max(right_depth) + 1)
            },
        }
    }

    fn pop_higher_operator(&mut self, precedence: i32, right_associative: bool) -> Option<Operator> {
        let higher = self.stack.last().is_some_and(|node| {
            node.precedence() > precedence || (node.precedence() == precedence && !right_associative)
        });
        match self.stack.last() {
            Some(StackNode::operator(operator)) if higher => {
                let operator = *operator;
                self.stack.pop();
                Some(operator)
            },
            _ => None,
        }
    }

    fn add_operator(&mut self, operator: Operator) -> ParseResult<()> {
        let node = StackNode::operator(operator);
        // prefix operators have no left operand to claim
        if let Operator::binary(binary) = operator {
            let right_associative = binary == BinaryOperator::exponentiation;
            while let Some(higher) = self.pop_higher_operator(node.precedence(), right_associative) {
                self.reduce(higher)?;
            }
        }
        self.stack.push(node);
        Ok(())
    }

    fn add_left_paren(&mut self) {
        self.stack.push(StackNode::punctuation(Punctuation::paren));
    }

    /// Turns the identifier just parsed into the name of a call.
    fn add_call(&mut self) -> ParseResult<()> {
        match self.expression.pop() {
            Some((ExprNode::identifier(name), _)) => {
                let base = self.expression.len();
                self.stack.push(StackNode::punctuation(Punctuation::call{name, base}));
                Ok(())
            },
            other => {
                self.expression.extend(other);
                Err(SyntaxError::did_not_expect("(".into()))
            },
        }
    }

    fn reduce_to_punctuation(&mut self) -> ParseResult<()> {
        while let Some(StackNode::operator(operator)) = self.stack.last() {
            let operator = *operator;
            self.stack.pop();
            self.reduce(operator)?;
        }
        Ok(())
    }

    fn add_comma(&mut self) -> ParseResult<()> {
        self.reduce_to_punctuation()?;
        match self.stack.last() {
            Some(StackNode::punctuation(Punctuation::call{..})) => Ok(()),
            _ => Err(SyntaxError::did_not_expect(",".into())),
        }
    }

    fn close_call(&mut self, name: String, base: usize) -> ParseResult<()> {
        let arguments = self.expression.split_off(base);
        let depth = arguments.iter().map(|(_, depth)| *depth).max().unwrap_or(0) + 1;
        let arguments = arguments.into_iter().map(|(node, _)| node).collect();
        self.push_operand(ExprNode::call{name, arguments}, depth)
    }

    fn add_right_paren(&mut self) -> ParseResult<()> {
        self.reduce_to_punctuation()?;
        match self.stack.pop() {
            Some(StackNode::punctuation(Punctuation::paren)) => Ok(()),
            Some(StackNode::punctuation(Punctuation::call{name, base})) => self.close_call(name, base),
            _ => Err(SyntaxError::did_not_expect(")".into())),
        }
    }

    /// `)` where an operand was expected: only valid as `name()`.
    fn add_empty_call_end(&mut self) -> ParseResult<()> {
        let arguments_start = self.expression.len();
        if !matches!(self.stack.last(), Some(StackNode::punctuation(Punctuation::call{base, ..})) if *base == arguments_start) {
            return Err(SyntaxError::did_not_expect(")".into()));
        }
        match self.stack.pop() {
            Some(StackNode::punctuation(Punctuation::call{name, base})) => self.close_call(name, base),
            _ => Ok(()),
        }
    }

    pub fn finish(mut self) -> ParseResult<ExprNode> {
        self.reduce_to_punctuation()?;
        if !self.stack.is_empty() {
            return Err(SyntaxError::could_not_find(")".into()));
        }
        let (root, _) = self.pop_operand()?;
        if self.expression.is_empty() {
            Ok(*root)
        } else {
            Err(SyntaxError::abrupt_end)
        }
    }
}

/// Handles a token where an operand is expected. Returns `true` once an
/// operand is complete.
pub fn handle_edge(yard: &mut Yard, token: &Token) -> ParseResult<bool> {
    use TokenKind::*;
    match token.kind {
        number => {
            yard.add_number(&token.content)?;
            Ok(true)
        },
        identifier => {
            yard.add_identifier(&token.content)?;
            Ok(true)
        },
        operator => {
            let parsed = token.content.parse().map_err(|_| SyntaxError::did_not_expect(token.content.clone()))?;
            yard.add_operator(Operator::unary(parsed))?;
            Ok(false)
        },
        punctuation => match token.content.as_str() {
            "(" => {
                yard.add_left_paren();
                Ok(false)
            },
            ")" => {
                yard.add_empty_call_end()?;
                Ok(true)
            },
            _ => Err(SyntaxError::did_not_expect(token.content.clone())),
        },
    }
}

/// Handles a token following a complete operand. Returns `true` when an
/// operand is expected next.
pub fn handle_middle(yard: &mut Yard, token: &Token) -> ParseResult<bool> {
    use TokenKind::*;
    match token.kind {
        operator => {
            let parsed = token.content.parse().map_err(|_| SyntaxError::did_not_expect(token.content.clone()))?;
            yard.add_operator(Operator::binary(parsed))?;
            Ok(true)
        },
        punctuation => match token.content.as_str() {
            ")" => {
                yard.add_right_paren()?;
                Ok(false)
            },
            "(" => {
                yard.add_call()?;
                Ok(true)
            },
            _ => {
                yard.add_comma()?;
                Ok(true)
            },
        },
        number | identifier => Err(SyntaxError::did_not_expect(token.content.clone())),
    }
}

pub fn parse<S: Scanner>(mut source: S) -> ParseResult<ExprNode> {
    let mut is_edge = true;
    let mut yard = Yard::new();

    while let Some(token) = source.get_current() {
        if is_edge {
            if handle_edge(&mut yard, token)? {
                is_edge = false;
            }
        } else if handle_middle(&mut yard, token)? {
            is_edge = true;
        }
        source.advance()?;
    }

    if is_edge {
        return Err(if yard.is_empty() { SyntaxError::empty_expression } else { SyntaxError::abrupt_end });
    }
    yard.finish()
}

pub fn parse_expression(text: &str) -> ParseResult<ExprNode> {
    parse(StringScanner::new(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::BinaryOperator::*;

    fn int(value: i64) -> Box<ExprNode> {
        Box::new(ExprNode::literal(Number::integer(value)))
    }

    fn binary(operator: BinaryOperator, left: Box<ExprNode>, right: Box<ExprNode>) -> Box<ExprNode> {
        Box::new(ExprNode::binary{operator, left, right})
    }

    fn negative(operand: Box<ExprNode>) -> Box<ExprNode> {
        Box::new(ExprNode::unary{operator: UnaryOperator::negative, operand})
    }

    fn parsed(text: &str) -> Box<ExprNode> {
        Box::new(parse_expression(text).unwrap())
    }

    #[test]
    fn respects_precedence() {
        assert_eq!(parsed("2 + 3 * 4"), binary(addition, int(2), binary(multiplication, int(3), int(4))));
        assert_eq!(parsed("(2 + 3) * 4"), binary(multiplication, binary(addition, int(2), int(3)), int(4)));
        assert_eq!(parsed("8 - 3 - 2"), binary(subtraction, binary(subtraction, int(8), int(3)), int(2)));
        assert_eq!(parsed("7 // 2 % 3"), binary(modulo, binary(floor_division, int(7), int(2)), int(3)));
    }

    #[test]
    fn exponentiation_is_right_associative_and_outranks_negation() {
        assert_eq!(parsed("2 ^ 3 ** 2"), binary(exponentiation, int(2), binary(exponentiation, int(3), int(2))));
        assert_eq!(parsed("-2 ^ 2"), negative(binary(exponentiation, int(2), int(2))));
        assert_eq!(parsed("2 ** -1"), binary(exponentiation, int(2), negative(int(1))));
        assert_eq!(parsed("-2 + 3"), binary(addition, negative(int(2)), int(3)));
    }

    #[test]
    fn builds_calls() {
        let expected = ExprNode::call{
            name: "max".into(),
            arguments: vec![
                ExprNode::literal(Number::integer(1)),
                *binary(addition, int(2), int(3)),
                ExprNode::call{name: "pi".into(), arguments: vec![]},
            ],
        };
        assert_eq!(parse_expression("max(1, 2 + 3, pi())"), Ok(expected));
        assert_eq!(
            parse_expression("-sqrt(x)"),
            Ok(*negative(Box::new(ExprNode::call{
                name: "sqrt".into(),
                arguments: vec![ExprNode::identifier("x".into())],
            })))
        );
    }

    #[test]
    fn reports_syntax_errors() {
        assert_eq!(parse_expression(""), Err(SyntaxError::empty_expression));
        assert_eq!(parse_expression("2 +"), Err(SyntaxError::abrupt_end));
        assert_eq!(parse_expression("(2 + 3"), Err(SyntaxError::could_not_find(")".into())));
        assert_eq!(parse_expression("2 + 3)"), Err(SyntaxError::did_not_expect(")".into())));
        assert_eq!(parse_expression("()"), Err(SyntaxError::did_not_expect(")".into())));
        assert_eq!(parse_expression("2 3"), Err(SyntaxError::did_not_expect("3".into())));
        assert_eq!(parse_expression("* 3"), Err(SyntaxError::did_not_expect("*".into())));
        assert_eq!(parse_expression("1, 2"), Err(SyntaxError::did_not_expect(",".into())));
        assert_eq!(parse_expression("max(1,)"), Err(SyntaxError::did_not_expect(")".into())));
        assert_eq!(parse_expression("(1 + 2)(3)"), Err(SyntaxError::did_not_expect("(".into())));
        assert_eq!(parse_expression("x == 3"), Err(SyntaxError::did_not_expect("==".into())));
        assert_eq!(parse_expression("1.2.3"), Err(SyntaxError::invalid_number("1.2.3".into())));
        assert_eq!(parse_expression("2 & 3"), Err(SyntaxError::invalid_character('&')));
    }

    #[test]
    fn limits_tree_depth() {
        let long_sum = format!("1{}", "+1".repeat(100_000));
        assert_eq!(parse_expression(&long_sum), Err(SyntaxError::too_deep(MAX_DEPTH)));

        let negations = format!("{}1", "-".repeat(200_000));
        assert_eq!(parse_expression(&negations), Err(SyntaxError::too_deep(MAX_DEPTH)));

        let nested_calls = format!("{}1{}", "abs(".repeat(1_000), ")".repeat(1_000));
        assert_eq!(parse_expression(&nested_calls), Err(SyntaxError::too_deep(MAX_DEPTH)));

        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(parse_expression(&parens), Ok(ExprNode::literal(Number::integer(1))));

        let within_limit = format!("1{}", "+1".repeat(MAX_DEPTH - 2));
        assert!(parse_expression(&within_limit).is_ok());
    }
}
