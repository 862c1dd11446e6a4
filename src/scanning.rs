use crate::error_handling::SyntaxError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    identifier, number, operator, punctuation
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub content: String,
    pub kind: TokenKind,
    /// Byte offset of the token within the scanned line.
    pub offset: usize,
}

impl Token {
    fn new(content: &str, kind: TokenKind, offset: usize) -> Self {
        Self{content: content.into(), kind, offset}
    }

    pub fn end(&self) -> usize {
        self.offset + self.content.len()
    }

    pub fn is(&self, kind: TokenKind, content: &str) -> bool {
        self.kind == kind && self.content == content
    }
}

pub trait Scanner {
    fn get_current(&self) -> Option<&Token>;
    fn advance(&mut self) -> Result<(), SyntaxError>;
}

/// Tokenizes a line lazily, one token per [`Scanner::advance`], so callers
/// can stop early without tripping over invalid text further along.
pub struct StringScanner<'a> {
    string: &'a str,
    token: Option<Token>,
    index: usize,
}

fn is_operator(character: char) -> bool {
    matches!(character, '+' | '-' | '*' | '/' | '%' | '^' | '=')
}

fn is_punctuation(character: char) -> bool {
    matches!(character, '(' | ')' | ',')
}

fn is_mantissa_character(character: char) -> bool {
    character.is_ascii_digit() || character == '.' || character == '_'
}

fn is_word(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_'
}

fn starts_number(view: &str) -> bool {
    let mut chars = view.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn has_radix_prefix(view: &str) -> bool {
    let bytes = view.as_bytes();
    bytes.len() > 1 && bytes[0] == b'0' && matches!(bytes[1].to_ascii_lowercase(), b'x' | b'b' | b'o')
}

fn count<P: Fn(char) -> bool>(view: &str, predicate: P) -> usize {
    view.find(|c: char| !predicate(c)).unwrap_or(view.len())
}

fn exponent_length(view: &str) -> usize {
    let bytes = view.as_bytes();
    if !matches!(bytes.first(), Some(b'e' | b'E')) {
        return 0;
    }
    let sign = usize::from(matches!(bytes.get(1), Some(b'+' | b'-')));
    let digits = count(&view[1 + sign..], |c| c.is_ascii_digit() || c == '_');
    if digits == 0 {
        0
    } else {
        1 + sign + digits
    }
}

impl<'a> StringScanner<'a> {
    pub fn new(string: &'a str) -> Result<Self, SyntaxError> {
        let mut source = Self {
            string,
            token: None,
            index: 0,
        };
        source.advance()?;
        Ok(source)
    }

    /// Unscanned text following the current token.
    pub fn remainder(&self) -> &'a str {
        &self.string[self.index..]
    }

    fn view(&self) -> &'a str {
        &self.string[self.index..]
    }

    fn skip_whitespace(&mut self) {
        self.index += count(self.view(), char::is_whitespace);
    }

    fn get_number(&self) -> Token {
        let view = self.view();
        let length = if has_radix_prefix(view) {
            2 + count(&view[2..], is_word)
        } else {
            let mantissa = count(view, is_mantissa_character);
            mantissa + exponent_length(&view[mantissa..])
        };
        Token::new(&view[..length], TokenKind::number, self.index)
    }

    fn get_word(&self) -> Token {
        let length = count(self.view(), is_word);
        Token::new(&self.view()[..length], TokenKind::identifier, self.index)
    }

    fn get_operator(&self) -> Token {
        let view = self.view();
        let length = if ["**", "//", "=="].iter().any(|pair| view.starts_with(pair)) { 2 } else { 1 };
        Token::new(&view[..length], TokenKind::operator, self.index)
    }

    fn get_single(&self, kind: TokenKind) -> Token {
        Token::new(&self.view()[..1], kind, self.index)
    }

    fn get_token(&self) -> Result<Option<Token>, SyntaxError> {
        let view = self.view();
        match view.chars().next() {
            None => Ok(None),
            Some(_) if starts_number(view) => Ok(Some(self.get_number())),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => Ok(Some(self.get_word())),
            Some(c) if is_operator(c) => Ok(Some(self.get_operator())),
            Some(c) if is_punctuation(c) => Ok(Some(self.get_single(TokenKind::punctuation))),
            Some(c) => Err(SyntaxError::invalid_character(c)),
        }
    }
}

impl Scanner for StringScanner<'_> {
    fn get_current(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.skip_whitespace();
        let token = self.get_token()?;
        if let Some(token) = &token {
            self.index += token.content.len();
        }
        self.token = token;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(line: &str) -> Result<Vec<(TokenKind, String)>, SyntaxError> {
        let mut scanner = StringScanner::new(line)?;
        let mut tokens = Vec::new();
        while let Some(token) = scanner.get_current() {
            tokens.push((token.kind.clone(), token.content.clone()));
            scanner.advance()?;
        }
        Ok(tokens)
    }

    fn contents(line: &str) -> Vec<String> {
        scan(line).unwrap().into_iter().map(|(_, content)| content).collect()
    }

    #[test]
    fn splits_operators_and_punctuation() {
        assert_eq!(contents("max(2,x)**3 // 4"), ["max", "(", "2", ",", "x", ")", "**", "3", "//", "4"]);
        assert_eq!(contents("a==b"), ["a", "==", "b"]);
    }

    #[test]
    fn scans_number_forms() {
        assert_eq!(contents("1_000 .5 5. 2.5e-3 1E6 0xff 0b101"), ["1_000", ".5", "5.", "2.5e-3", "1E6", "0xff", "0b101"]);
        // An exponent marker without digits is left for the identifier rule.
        assert_eq!(contents("2e"), ["2", "e"]);
    }

    #[test]
    fn classifies_tokens() {
        let tokens = scan("x1 = 2").unwrap();
        assert_eq!(tokens[0].0, TokenKind::identifier);
        assert_eq!(tokens[1].0, TokenKind::operator);
        assert_eq!(tokens[2].0, TokenKind::number);
    }

    #[test]
    fn rejects_unknown_characters() {
        assert_eq!(scan("2 $ 3"), Err(SyntaxError::invalid_character('$')));
        assert_eq!(scan("x.y"), Err(SyntaxError::invalid_character('.')));
    }

    #[test]
    fn stops_lazily() {
        let mut scanner = StringScanner::new("total = 3 $").unwrap();
        scanner.advance().unwrap();
        let token = scanner.get_current().unwrap();
        assert!(token.is(TokenKind::operator, "="));
        assert_eq!(token.end(), 7);
        assert_eq!(scanner.remainder(), " 3 $");
    }
}
