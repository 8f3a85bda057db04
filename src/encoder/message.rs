//! `{}` placeholder substitution for message templates.

use std::fmt::{self, Write as _};

const DELIM: &str = "{}";
const ESCAPE: char = '\\';

/// Substitute positional `{}` placeholders with `args`, left to right.
///
/// Placeholders without a matching argument stay literal and surplus
/// arguments are ignored. `\{}` renders a literal `{}`; `\\{}` renders one
/// backslash followed by the substituted argument.
pub fn format_message(template: &str, args: &[&dyn fmt::Display]) -> String {
    if args.is_empty() || !template.contains(DELIM) {
        return template.to_owned();
    }

    let mut out = String::with_capacity(template.len() + 16 * args.len());
    let mut rest = template;
    let mut next_arg = args.iter();

    while let Some(idx) = rest.find(DELIM) {
        let before = &rest[..idx];
        let escaped = before.ends_with(ESCAPE);
        let double_escaped = escaped && before[..before.len() - 1].ends_with(ESCAPE);

        if escaped && !double_escaped {
            out.push_str(&before[..before.len() - 1]);
            out.push_str(DELIM);
        } else {
            let before = if double_escaped { &before[..before.len() - 1] } else { before };
            out.push_str(before);
            match next_arg.next() {
                Some(arg) => {
                    let _ = write!(out, "{}", arg);
                }
                None => {
                    out.push_str(DELIM);
                    out.push_str(&rest[idx + DELIM.len()..]);
                    return out;
                }
            }
        }
        rest = &rest[idx + DELIM.len()..];
    }
    out.push_str(rest);
    out
}
