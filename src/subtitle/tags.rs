//! Removal of inline markup from imported subtitle text.

/// Removes every `{\...}` override block and turns the `\N` and `\n` escapes into real line
/// breaks. A brace not followed by a backslash is ordinary text. An unterminated block runs to
/// the end of the input.
#[must_use]
pub fn strip_block_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(char) = chars.next() {
        match (char, chars.peek().copied()) {
            ('{', Some('\\')) => {
                for inner in chars.by_ref() {
                    if inner == '}' {
                        break;
                    }
                }
            }
            ('\\', Some('N' | 'n')) => {
                chars.next();
                result.push('\n');
            }
            _ => result.push(char),
        }
    }

    result
}

/// Removes every `<...>` tag. An unterminated tag runs to the end of the input.
#[must_use]
pub fn strip_angle_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut inside_tag = false;

    for char in text.chars() {
        match char {
            '<' if !inside_tag => inside_tag = true,
            '>' if inside_tag => inside_tag = false,
            _ if inside_tag => {}
            _ => result.push(char),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_tags() {
        assert_eq!(strip_block_tags("plain"), "plain");
        assert_eq!(
            strip_block_tags(r"{\i1}Hello{\i0} world"),
            "Hello world"
        );
        assert_eq!(strip_block_tags(r"one\Ntwo\nthree"), "one\ntwo\nthree");
        assert_eq!(strip_block_tags(r"{\pos(1,2)\c&HFF&}x"), "x");
        assert_eq!(strip_block_tags("{not a tag}"), "{not a tag}");
        assert_eq!(strip_block_tags(r"\h stays"), r"\h stays");
        assert_eq!(strip_block_tags(r"ends {\b1 unterminated"), "ends ");
        assert_eq!(strip_block_tags("Ёжик {\\b1}в тумане"), "Ёжик в тумане");
    }

    #[test]
    fn angle_tags() {
        assert_eq!(strip_angle_tags("<i>Hello</i> world"), "Hello world");
        assert_eq!(
            strip_angle_tags(r#"<font color="red">red</font>"#),
            "red"
        );
        assert_eq!(strip_angle_tags("a > b"), "a > b");
        assert_eq!(strip_angle_tags("cut <here"), "cut ");
        assert_eq!(strip_angle_tags(""), "");
    }
}
