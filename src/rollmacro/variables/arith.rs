//! Arithmetic evaluation for change commands.
//!
//! Supports decimal literals (with optional exponent), `+ - * / %`, unary signs and
//! parentheses. Anything else (dice notation, identifiers, trailing operators)
//! fails to evaluate, and so does a non-finite result such as division by zero.
//! Nesting of parentheses and unary signs is capped at [`MAX_DEPTH`].

pub const MAX_DEPTH: usize = 256;

/// Evaluate `input` as an arithmetic expression.
pub fn evaluate(input: &str) -> Option<f64> {
    let mut parser = Parser::new(input);
    let value = parser.expr()?;
    parser.skip_ws();
    if parser.peek().is_some() || !value.is_finite() {
        return None;
    }
    Some(value)
}

/// Parse a whole string as a number the way loosely-typed hosts do: surrounding
/// whitespace is ignored and an empty string counts as zero.
pub fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if trimmed
        .chars()
        .any(|c| c.is_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a number without a trailing `.0` for integral values.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            depth: 0,
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn expr(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.chars.next();
                    value += self.term()?;
                }
                Some('-') => {
                    self.chars.next();
                    value -= self.term()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut value = self.factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.chars.next();
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.chars.next();
                    value /= self.factor()?;
                }
                Some('%') => {
                    self.chars.next();
                    value %= self.factor()?;
                }
                _ => return Some(value),
            }
        }
    }

    fn factor(&mut self) -> Option<f64> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = self.unary();
        self.depth -= 1;
        value
    }

    fn unary(&mut self) -> Option<f64> {
        self.skip_ws();
        match self.peek()? {
            '+' => {
                self.chars.next();
                self.factor()
            }
            '-' => {
                self.chars.next();
                self.factor().map(|v| -v)
            }
            '(' => {
                self.chars.next();
                let value = self.expr()?;
                self.skip_ws();
                match self.chars.next() {
                    Some(')') => Some(value),
                    _ => None,
                }
            }
            c if c.is_ascii_digit() || c == '.' => self.number(),
            _ => None,
        }
    }

    fn number(&mut self) -> Option<f64> {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                literal.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if let Some(e @ ('e' | 'E')) = self.peek() {
            literal.push(e);
            self.chars.next();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                literal.push(sign);
                self.chars.next();
            }
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    literal.push(c);
                    self.chars.next();
                } else {
                    break;
                }
            }
        }
        literal.parse().ok()
    }
}
