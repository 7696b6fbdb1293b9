use crate::error::SyntaxError;

/// Splits a multi-valued cell on `;`.
///
/// Separators inside of double or single quotes are kept, `\;` outside of quotes is a literal `;`.
/// Values are trimmed and empty values are skipped. Quotes and other escapes are kept as is,
/// so each value can be parsed as an expression afterwards.
///
/// ```
/// use oxmanchester::split_values;
///
/// assert_eq!(
///     split_values("'part of' some 'leaf; blade' ; PO:0000003")?,
///     ["'part of' some 'leaf; blade'", "PO:0000003"]
/// );
/// # Result::<_, oxmanchester::SyntaxError>::Ok(())
/// ```
pub fn split_values(cell: &str) -> Result<Vec<String>, SyntaxError> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut quote = None;
    let mut chars = cell.chars().enumerate();
    while let Some((position, c)) = chars.next() {
        match (quote, c) {
            (_, '\\') => match chars.next() {
                Some((_, ';')) if quote.is_none() => current.push(';'),
                Some((_, escaped)) => {
                    current.push('\\');
                    current.push(escaped);
                }
                None => current.push('\\'),
            },
            (None, ';') => push_value(&mut values, &mut current),
            (None, '"' | '\'') => {
                quote = Some((c, position));
                current.push(c);
            }
            (Some((open, _)), _) if c == open => {
                quote = None;
                current.push(c);
            }
            _ => current.push(c),
        }
    }
    if let Some((open, position)) = quote {
        return Err(SyntaxError::new(
            position,
            format!("unterminated quote, missing {open}"),
        ));
    }
    push_value(&mut values, &mut current);
    Ok(values)
}

fn push_value(values: &mut Vec<String>, current: &mut String) {
    let value = current.trim();
    if !value.is_empty() {
        values.push(value.to_owned());
    }
    current.clear();
}
