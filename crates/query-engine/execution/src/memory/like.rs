//! Case-insensitive `LIKE` patterns.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `%`
    AnySequence,
    /// `_`
    AnyCharacter,
    Literal(char),
}

/// Whether `text` matches `pattern` the way `text ILIKE pattern` does. `%` matches any
/// sequence, `_` any single character and `\` escapes the character after it.
pub fn ilike(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let tokens = tokenize(&pattern.to_lowercase());

    let (mut position, mut token) = (0, 0);
    // The last `%` seen, and the text position it currently stands in for.
    let mut backtrack: Option<(usize, usize)> = None;

    while position < text.len() {
        match tokens.get(token) {
            Some(Token::AnySequence) => {
                backtrack = Some((token, position));
                token += 1;
            }
            Some(Token::AnyCharacter) => {
                position += 1;
                token += 1;
            }
            Some(Token::Literal(c)) if *c == text[position] => {
                position += 1;
                token += 1;
            }
            _ => match backtrack {
                Some((star, start)) => {
                    token = star + 1;
                    position = start + 1;
                    backtrack = Some((star, start + 1));
                }
                None => return false,
            },
        }
    }

    tokens[token.min(tokens.len())..]
        .iter()
        .all(|token| *token == Token::AnySequence)
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = vec![];
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::AnySequence,
            '_' => Token::AnyCharacter,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            c => Token::Literal(c),
        });
    }
    tokens
}
