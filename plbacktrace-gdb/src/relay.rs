//! 出力リレー
//!
//! gdbのstdoutとstderrを2つの独立した並行タスクで読み取り、
//! 単一のチャネルへタグ付きメッセージとして合流させる。
//! このチャネルが3つの並行活動（2つのリーダーと消費側ループ）の
//! 唯一の同期点であり、他に共有可変状態は存在しない。

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// リレーが運ぶメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// gdb stdoutの1行
    Line(String),
    /// stdoutが閉じた（正常終了）
    Eof,
    /// stderrに診断出力が現れた（異常終了）
    Abort,
}

/// stdout/stderrのリレータスクを起動し、受信側チャネルを返す
///
/// 各ストリーム内の行順序はチャネル上でも保存される。
/// ストリーム間の順序は保証しない。タスクはストリームが閉じると
/// 自動的に終わる。
pub fn spawn_readers<O, E>(stdout: O, stderr: E) -> UnboundedReceiver<RelayMessage>
where
    O: AsyncRead + Unpin + Send + 'static,
    E: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(read_stdout(stdout, tx.clone()));
    tokio::spawn(read_stderr(stderr, tx));
    rx
}

/// stdoutを1行ずつチャネルへ流し、閉じたらEofをちょうど1回送る
async fn read_stdout<R>(stream: R, tx: UnboundedSender<RelayMessage>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(RelayMessage::Line(line)).is_err() {
                    // 受信側が先に終了した
                    return;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("failed to read gdb stdout: {}", e);
                break;
            }
        }
    }
    debug!("gdb stdout closed");
    let _ = tx.send(RelayMessage::Eof);
}

/// stderrの各行を自身のstderrへそのまま中継し、Abortを送る
///
/// 診断出力（"No such process" など）は操作者へ直接見せる。
/// 最初の1行を見た時点でAbortを送り、届くことのないstdout行を
/// 消費側が待ち続けないようにする。
async fn read_stderr<R>(stream: R, tx: UnboundedSender<RelayMessage>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        eprintln!("{}", line);
        if tx.send(RelayMessage::Abort).is_err() {
            return;
        }
    }
    debug!("gdb stderr closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// チャネルが閉じるまですべてのメッセージを回収する
    async fn collect(mut rx: UnboundedReceiver<RelayMessage>) -> Vec<RelayMessage> {
        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message);
        }
        messages
    }

    #[tokio::test]
    async fn test_stdout_lines_preserve_order_and_end_with_eof() {
        let rx = spawn_readers(&b"one\ntwo\nthree\n"[..], &b""[..]);
        let messages = collect(rx).await;
        assert_eq!(
            messages,
            vec![
                RelayMessage::Line("one".to_string()),
                RelayMessage::Line("two".to_string()),
                RelayMessage::Line("three".to_string()),
                RelayMessage::Eof,
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_stdout_sends_single_eof() {
        let rx = spawn_readers(&b""[..], &b""[..]);
        let messages = collect(rx).await;
        assert_eq!(messages, vec![RelayMessage::Eof]);
    }

    #[tokio::test]
    async fn test_stderr_line_triggers_abort() {
        // 2つのタスク間の順序は保証されないので、内容だけ確認する
        let rx = spawn_readers(&b""[..], &b"ptrace: No such process.\n"[..]);
        let messages = collect(rx).await;
        assert!(messages.contains(&RelayMessage::Abort));
        assert!(messages.contains(&RelayMessage::Eof));
    }

    #[tokio::test]
    async fn test_abort_per_diagnostic_line() {
        let rx = spawn_readers(&b""[..], &b"warning: one\nwarning: two\n"[..]);
        let messages = collect(rx).await;
        let aborts = messages
            .iter()
            .filter(|m| **m == RelayMessage::Abort)
            .count();
        assert_eq!(aborts, 2);
    }
}
