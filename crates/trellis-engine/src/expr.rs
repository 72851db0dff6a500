/// Extract dotted variable references from an expression string.
///
/// `"comp2.c*comp2.d + sin(comp1.a)"` yields `comp2.c`, `comp2.d`, and
/// `comp1.a`. Bare identifiers (function names, named constants) and
/// numeric literals are skipped; the caller resolves each candidate
/// against the scope and rejects unknown ones. Duplicates are dropped,
/// first occurrence wins.
pub(crate) fn extract_references(expr: &str) -> Vec<String> {
  let chars: Vec<char> = expr.chars().collect();
  let mut refs: Vec<String> = Vec::new();
  let mut i = 0;
  while i < chars.len() {
    let c = chars[i];
    if c.is_ascii_alphabetic() || c == '_' {
      let start = i;
      while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
      {
        i += 1;
      }
      let mut end = i;
      while end > start && chars[end - 1] == '.' {
        end -= 1;
      }
      let candidate: String = chars[start..end].iter().collect();
      if candidate.contains('.') && !refs.contains(&candidate) {
        refs.push(candidate);
      }
    } else if c.is_ascii_digit() {
      // numeric literal, including a fractional part
      while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        i += 1;
      }
    } else {
      i += 1;
    }
  }
  refs
}
