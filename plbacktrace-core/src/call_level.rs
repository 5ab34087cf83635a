//! PL/pgSQL呼び出しレベルのレコード

use std::fmt;

/// 再構成された1つのPL/pgSQL呼び出しレベル
///
/// 構築後は不変。標準出力へ即座に書き出され、履歴は保持しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallLevel {
    /// 現在実行中の文の行番号
    pub lineno: String,
    /// pg_proc上の関数OID
    pub fn_oid: String,
    /// 関数シグネチャ（プレフィックスを除いたもの）
    pub func: String,
}

impl CallLevel {
    /// 収集した3つのprint結果からレコードを組み立てる
    ///
    /// 値は [行番号, fn_oid, 生シグネチャ] の固定順で渡される。
    /// 生シグネチャの先頭トークンは型カテゴリのプレフィックスなので
    /// 取り除く。
    pub fn from_values(lineno: String, fn_oid: String, raw_signature: String) -> Self {
        let func = trim_signature_prefix(&raw_signature).to_string();
        Self {
            lineno,
            fn_oid,
            func,
        }
    }
}

impl fmt::Display for CallLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fn_oid={} lineno={} func={}",
            self.fn_oid, self.lineno, self.func
        )
    }
}

/// シグネチャ先頭の空白区切りトークンを1つ取り除く
///
/// 空白を含まない場合は全体をそのまま返す。
fn trim_signature_prefix(raw: &str) -> &str {
    match raw.split_once(' ') {
        Some((_, rest)) => rest,
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_prefix_is_trimmed() {
        let level = CallLevel::from_values(
            "7".to_string(),
            "16390".to_string(),
            "FUNCTION foo(integer)".to_string(),
        );
        assert_eq!(level.func, "foo(integer)");
    }

    #[test]
    fn test_signature_without_space_is_kept_whole() {
        let level = CallLevel::from_values(
            "1".to_string(),
            "16391".to_string(),
            "foo()".to_string(),
        );
        assert_eq!(level.func, "foo()");
    }

    #[test]
    fn test_only_first_token_is_trimmed() {
        let level = CallLevel::from_values(
            "3".to_string(),
            "16392".to_string(),
            "FUNCTION bar(integer, text)".to_string(),
        );
        assert_eq!(level.func, "bar(integer, text)");
    }

    #[test]
    fn test_output_format() {
        let level = CallLevel::from_values(
            "7".to_string(),
            "16390".to_string(),
            "FUNCTION foo(integer)".to_string(),
        );
        assert_eq!(level.to_string(), "fn_oid=16390 lineno=7 func=foo(integer)");
    }
}
