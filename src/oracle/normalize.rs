//! oracle 响应归一化
//!
//! 各家模型经常不听"只返回数字"的指令，会带上客套话或
//! "Answer: 3" 之类的包装，这里统一压成一个整数。

use regex::Regex;
use std::sync::OnceLock;

fn whole_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\s*$").expect("合法的正则字面量"))
}

fn digit_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("合法的正则字面量"))
}

/// 把 oracle 的自由文本响应归一化为选项序号
///
/// 优先级：
/// 1. 整个响应就是一个数字 → 直接取
/// 2. 否则取响应中第一段连续数字
/// 3. 都没有 → None
pub fn extract_index(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();

    if let Some(caps) = whole_number_re().captures(trimmed) {
        return caps.get(1)?.as_str().parse().ok();
    }

    digit_run_re()
        .find(trimmed)
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_number() {
        assert_eq!(extract_index("3"), Some(3));
        assert_eq!(extract_index("  2  "), Some(2));
    }

    #[test]
    fn test_labeled_answer() {
        assert_eq!(extract_index("Answer: 3"), Some(3));
    }

    #[test]
    fn test_conversational_response() {
        assert_eq!(extract_index("I believe option 2 is correct."), Some(2));
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(extract_index("no idea"), None);
        assert_eq!(extract_index(""), None);
    }

    #[test]
    fn test_first_digit_run_wins() {
        assert_eq!(extract_index("options 12 and 3 both look right"), Some(12));
    }
}
