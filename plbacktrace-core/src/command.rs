//! gdbへ送信するコマンド

use std::fmt;

/// gdbへ送信するコマンド
///
/// `Display`実装が実際のコマンド文字列を生成する。
/// 応答は待たない前提なので、コマンドと応答の対応付け情報は持たない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GdbCommand {
    /// 対象バックエンドプロセスへアタッチ
    Attach(i32),
    /// ネイティブバックトレースを取得
    Backtrace,
    /// スタックフレームを選択
    SelectFrame(u32),
    /// 選択中フレームのソースを表示
    ListSource,
    /// 現在実行中の文の行番号を表示
    PrintStmtLineno,
    /// PL/pgSQL関数のOIDを表示
    PrintFnOid,
    /// PL/pgSQL関数のシグネチャを表示
    PrintFnSignature,
    /// gdbを終了
    Quit,
}

impl fmt::Display for GdbCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GdbCommand::Attach(pid) => write!(f, "attach {}", pid),
            GdbCommand::Backtrace => write!(f, "bt"),
            GdbCommand::SelectFrame(index) => write!(f, "select-frame {}", index),
            GdbCommand::ListSource => write!(f, "l"),
            GdbCommand::PrintStmtLineno => write!(f, "p stmt->lineno"),
            GdbCommand::PrintFnOid => write!(f, "p func->fn_oid"),
            GdbCommand::PrintFnSignature => write!(f, "p func->fn_signature"),
            GdbCommand::Quit => write!(f, "quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_text() {
        assert_eq!(GdbCommand::Attach(4242).to_string(), "attach 4242");
        assert_eq!(GdbCommand::Backtrace.to_string(), "bt");
        assert_eq!(GdbCommand::SelectFrame(3).to_string(), "select-frame 3");
        assert_eq!(GdbCommand::ListSource.to_string(), "l");
        assert_eq!(GdbCommand::PrintStmtLineno.to_string(), "p stmt->lineno");
        assert_eq!(GdbCommand::PrintFnOid.to_string(), "p func->fn_oid");
        assert_eq!(GdbCommand::PrintFnSignature.to_string(), "p func->fn_signature");
        assert_eq!(GdbCommand::Quit.to_string(), "quit");
    }
}
