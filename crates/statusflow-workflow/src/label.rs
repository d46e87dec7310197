//! Default status labels derived from local ids.

/// Turn an identifier into words: `readyToPublish` and `ready-to-publish`
/// both become `Ready To Publish`.
///
/// A space is inserted before an uppercase letter that is not preceded by
/// another uppercase letter, or that starts a capitalized word; `-`, `_` and
/// `.` act as word separators.
pub fn humanize(id: &str) -> String {
  let chars: Vec<char> = id.chars().collect();
  let mut spaced = String::with_capacity(id.len() + 4);

  for (i, &c) in chars.iter().enumerate() {
    if c.is_uppercase() {
      let after_upper = i > 0 && chars[i - 1].is_uppercase();
      let before_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
      if !after_upper || before_lower {
        spaced.push(' ');
      }
    }
    if matches!(c, '-' | '_' | '.') {
      spaced.push(' ');
    } else {
      spaced.push(c);
    }
  }

  spaced
    .split_whitespace()
    .map(capitalize)
    .collect::<Vec<_>>()
    .join(" ")
}

fn capitalize(word: &str) -> String {
  let lower = word.to_lowercase();
  let mut chars = lower.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_humanize() {
    assert_eq!(humanize("new"), "New");
    assert_eq!(humanize("readyToPublish"), "Ready To Publish");
    assert_eq!(humanize("ready-to-publish"), "Ready To Publish");
    assert_eq!(humanize("on_hold"), "On Hold");
    assert_eq!(humanize("HTTPRequest"), "Http Request");
    assert_eq!(humanize("step2"), "Step2");
    assert_eq!(humanize("A"), "A");
  }
}
