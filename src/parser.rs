//! Regex tokenizer and parsers for the concrete syntax of spec.md §4.9/§6.
//!
//! No existing pack repo ships a from-scratch recursive-descent regex parser paired with
//! this exact grammar, so this module is grounded directly on spec.md §4.9's token and
//! grammar description; the general token-then-grammar split follows the shape every
//! hand-rolled parser in the pack uses (e.g. `loliGothicK-regex-soup-bot/src/parser.rs`),
//! without pulling in that repo's `combine` dependency — the grammar here is small and
//! fully pinned down, so a parser combinator library buys nothing.

use crate::alphabet::Alphabet;
use crate::error::ParseError;
use crate::regex::RegularExpression;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    RParenStar,
    Plus,
    Word(String),
    CharStar(char),
    Eps,
    Null,
    End,
}

/// Strips whitespace and expands every `.` into `(s1+s2+...)` over the declared alphabet,
/// before tokenization (spec.md §4.9/§6).
fn expand_dots(input: &str, alphabet: &Alphabet) -> String {
    let stripped: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !stripped.contains('.') {
        return stripped;
    }
    let expansion = format!(
        "({})",
        alphabet.symbols().iter().map(|c| c.to_string()).collect::<Vec<_>>().join("+")
    );
    stripped.replace('.', &expansion)
}

/// Splits a whitespace-free, dot-expanded source string into tokens. A maximal run of
/// alphabet letters not immediately followed by `*` becomes one `Word`; a letter
/// immediately followed by `*` becomes a `CharStar` and breaks the run (spec.md §4.9).
fn tokenize(src: &str, alphabet: &Alphabet) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut word_buf = String::new();

    macro_rules! flush_word {
        () => {
            if !word_buf.is_empty() {
                tokens.push(Token::Word(std::mem::take(&mut word_buf)));
            }
        };
    }

    while i < chars.len() {
        let c = chars[i];
        if alphabet.contains(c) {
            if i + 1 < chars.len() && chars[i + 1] == '*' {
                flush_word!();
                tokens.push(Token::CharStar(c));
                i += 2;
            } else {
                word_buf.push(c);
                i += 1;
            }
            continue;
        }
        flush_word!();
        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    tokens.push(Token::RParenStar);
                    i += 2;
                } else {
                    tokens.push(Token::RParen);
                    i += 1;
                }
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            'E' | '1' => {
                tokens.push(Token::Eps);
                i += 1;
            }
            '0' => {
                tokens.push(Token::Null);
                i += 1;
            }
            other => return Err(ParseError::UnexpectedChar(other)),
        }
    }
    flush_word!();
    tokens.push(Token::End);
    Ok(tokens)
}

fn factor_starts(token: &Token) -> bool {
    matches!(token, Token::LParen | Token::Word(_) | Token::CharStar(_) | Token::Eps | Token::Null)
}

/// Hand-rolled recursive-descent parser over the grammar in spec.md §4.9:
///
/// ```text
/// re      := product ( '+' re )?
/// product := factor ( product )?
/// factor  := '(' re ( ')' | ')*' )
///          | Word | CharStar | Eps | Null
/// ```
struct RecursiveDescent<'a> {
    tokens: Vec<Token>,
    pos: usize,
    alphabet: &'a Alphabet,
}

impl<'a> RecursiveDescent<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn parse_re(&mut self) -> Result<RegularExpression, ParseError> {
        let left = self.parse_product()?;
        if matches!(self.peek(), Token::Plus) {
            self.advance();
            let right = self.parse_re()?;
            Ok(left.sum(right))
        } else {
            Ok(left)
        }
    }

    fn parse_product(&mut self) -> Result<RegularExpression, ParseError> {
        let left = self.parse_factor()?;
        if factor_starts(self.peek()) {
            let right = self.parse_product()?;
            Ok(left.concat(right))
        } else {
            Ok(left)
        }
    }

    fn parse_factor(&mut self) -> Result<RegularExpression, ParseError> {
        match self.advance() {
            Token::LParen => {
                let inner = self.parse_re()?;
                match self.advance() {
                    Token::RParen => Ok(inner),
                    Token::RParenStar => Ok(inner.star()),
                    Token::End => Err(ParseError::UnmatchedOpenParen),
                    _ => Err(ParseError::UnmatchedOpenParen),
                }
            }
            Token::Word(w) => Ok(RegularExpression::word(self.alphabet, w)),
            Token::CharStar(c) => Ok(RegularExpression::word(self.alphabet, c.to_string()).star()),
            Token::Eps => Ok(RegularExpression::epsilon(self.alphabet)),
            Token::Null => Ok(RegularExpression::empty(self.alphabet)),
            Token::RParen | Token::RParenStar => Err(ParseError::UnmatchedCloseParen),
            Token::Plus | Token::End => Err(ParseError::UnexpectedTokenInFactor),
        }
    }
}

/// Parses `input` against `alphabet` using the hand-rolled recursive-descent parser
/// (spec.md §4.9).
pub fn parse(input: &str, alphabet: &Alphabet) -> Result<RegularExpression, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptySource);
    }
    let expanded = expand_dots(input, alphabet);
    let tokens = tokenize(&expanded, alphabet)?;
    let mut parser = RecursiveDescent { tokens, pos: 0, alphabet };
    let result = parser.parse_re()?;
    match parser.peek() {
        Token::End => Ok(result),
        _ => Err(ParseError::TrailingInput),
    }
}

/// Parses against the default `a`,`b` alphabet.
pub fn parse_default(input: &str) -> Result<RegularExpression, ParseError> {
    parse(input, &Alphabet::default_ab())
}

/// Grammar symbols for the table-driven parser below: non-terminals name the three
/// grammar rules; `Maybe*`/`Reduce*`/`ParenClose` are the explicit continuation and
/// reduction actions a generated LL(1) driver would otherwise hide inside its table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Symbol {
    Re,
    Product,
    Factor,
    MaybePlus,
    MaybeConcat,
    ParenClose,
    ReduceSum,
    ReduceConcat,
    End,
}

/// Alternative entry point driven by an explicit pushdown symbol stack instead of the
/// Rust call stack, over the same grammar and surface syntax (spec.md §4.9, "An
/// alternative grammar-generator-driven parser is also supported"). Grammar symbols are
/// pushed and popped exactly as a table-driven LL(1) parser would drive them, with a
/// side value stack standing in for semantic actions; [`parse`] and this entry point are
/// cross-checked against each other in this module's tests.
pub fn parse_via_grammar_table(input: &str, alphabet: &Alphabet) -> Result<RegularExpression, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptySource);
    }
    let expanded = expand_dots(input, alphabet);
    let tokens = tokenize(&expanded, alphabet)?;

    let mut pos = 0usize;
    let peek = |pos: usize| -> &Token { &tokens[pos.min(tokens.len() - 1)] };

    let mut values: Vec<RegularExpression> = Vec::new();
    let mut symbols: Vec<Symbol> = vec![Symbol::End, Symbol::Re];

    while let Some(sym) = symbols.pop() {
        match sym {
            Symbol::Re => {
                symbols.push(Symbol::MaybePlus);
                symbols.push(Symbol::Product);
            }
            Symbol::MaybePlus => {
                if matches!(peek(pos), Token::Plus) {
                    pos += 1;
                    symbols.push(Symbol::ReduceSum);
                    symbols.push(Symbol::Re);
                }
            }
            Symbol::Product => {
                symbols.push(Symbol::MaybeConcat);
                symbols.push(Symbol::Factor);
            }
            Symbol::MaybeConcat => {
                if factor_starts(peek(pos)) {
                    symbols.push(Symbol::ReduceConcat);
                    symbols.push(Symbol::Product);
                }
            }
            Symbol::Factor => match &tokens[pos] {
                Token::LParen => {
                    pos += 1;
                    symbols.push(Symbol::ParenClose);
                    symbols.push(Symbol::Re);
                }
                Token::Word(w) => {
                    values.push(RegularExpression::word(alphabet, w.clone()));
                    pos += 1;
                }
                Token::CharStar(c) => {
                    values.push(RegularExpression::word(alphabet, c.to_string()).star());
                    pos += 1;
                }
                Token::Eps => {
                    values.push(RegularExpression::epsilon(alphabet));
                    pos += 1;
                }
                Token::Null => {
                    values.push(RegularExpression::empty(alphabet));
                    pos += 1;
                }
                Token::RParen | Token::RParenStar => return Err(ParseError::UnmatchedCloseParen),
                Token::Plus | Token::End => return Err(ParseError::UnexpectedTokenInFactor),
            },
            Symbol::ParenClose => match &tokens[pos] {
                Token::RParen => pos += 1,
                Token::RParenStar => {
                    pos += 1;
                    let inner = values.pop().expect("Re pushed exactly one value before ParenClose");
                    values.push(inner.star());
                }
                _ => return Err(ParseError::UnmatchedOpenParen),
            },
            Symbol::ReduceSum => {
                let right = values.pop().expect("Re pushed a value before ReduceSum");
                let left = values.pop().expect("Product pushed a value before ReduceSum");
                values.push(left.sum(right));
            }
            Symbol::ReduceConcat => {
                let right = values.pop().expect("Product pushed a value before ReduceConcat");
                let left = values.pop().expect("Factor pushed a value before ReduceConcat");
                values.push(left.concat(right));
            }
            Symbol::End => {
                if !matches!(peek(pos), Token::End) {
                    return Err(ParseError::TrailingInput);
                }
            }
        }
    }

    values.pop().ok_or(ParseError::EmptySource)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab() -> Alphabet {
        Alphabet::new(['a', 'b'])
    }

    #[test]
    fn parses_plain_word() {
        let r = parse("ab", &ab()).unwrap();
        assert!(r.accepts("ab"));
        assert!(!r.accepts("a"));
    }

    #[test]
    fn parses_char_star() {
        let r = parse("a*", &ab()).unwrap();
        assert!(r.accepts(""));
        assert!(r.accepts("aaa"));
        assert!(!r.accepts("b"));
    }

    #[test]
    fn parses_group_star() {
        let r = parse("(ab)*", &ab()).unwrap();
        assert!(r.accepts(""));
        assert!(r.accepts("abab"));
        assert!(!r.accepts("aba"));
    }

    #[test]
    fn parses_sum_and_concat_precedence() {
        let r = parse("a(a+b)*", &ab()).unwrap();
        assert!(r.accepts("aa"));
        assert!(r.accepts("aab"));
        assert!(!r.accepts("bab"));
    }

    #[test]
    fn parses_epsilon_and_null() {
        let eps = parse("E", &ab()).unwrap();
        assert!(eps.accepts(""));
        assert!(!eps.accepts("a"));
        let one = parse("1", &ab()).unwrap();
        assert!(one.accepts(""));
        let null = parse("0", &ab()).unwrap();
        assert!(!null.accepts(""));
        assert!(!null.accepts("a"));
    }

    #[test]
    fn parses_dot_expansion() {
        let r = parse(".", &ab()).unwrap();
        assert!(r.accepts("a"));
        assert!(r.accepts("b"));
        assert!(!r.accepts(""));
        assert!(!r.accepts("aa"));
    }

    #[test]
    fn whitespace_is_ignored() {
        let r = parse(" a  + b ", &ab()).unwrap();
        assert!(r.accepts("a"));
        assert!(r.accepts("b"));
    }

    #[test]
    fn rejects_unmatched_paren() {
        assert_eq!(parse("(a", &ab()).unwrap_err(), ParseError::UnmatchedOpenParen);
        assert_eq!(parse("a)", &ab()).unwrap_err(), ParseError::UnmatchedCloseParen);
    }

    #[test]
    fn rejects_unexpected_character() {
        assert_eq!(parse("a#b", &ab()).unwrap_err(), ParseError::UnexpectedChar('#'));
    }

    #[test]
    fn rejects_empty_source() {
        assert_eq!(parse("", &ab()).unwrap_err(), ParseError::EmptySource);
        assert_eq!(parse("   ", &ab()).unwrap_err(), ParseError::EmptySource);
    }

    #[test]
    fn grammar_table_parser_agrees_with_recursive_descent() {
        for src in ["ab", "a*", "(ab)*", "a(a+b)*", "a+b(a+bb)*", ".", "0", "E", "1"] {
            let rd = parse(src, &ab()).unwrap();
            let table = parse_via_grammar_table(src, &ab()).unwrap();
            assert!(rd.similar(&table), "mismatch for {:?}", src);
        }
    }

    #[test]
    fn grammar_table_parser_rejects_same_errors() {
        assert_eq!(parse_via_grammar_table("(a", &ab()).unwrap_err(), ParseError::UnmatchedOpenParen);
        assert_eq!(parse_via_grammar_table("a)", &ab()).unwrap_err(), ParseError::UnmatchedCloseParen);
        assert_eq!(parse_via_grammar_table("a#b", &ab()).unwrap_err(), ParseError::UnexpectedChar('#'));
    }
}
