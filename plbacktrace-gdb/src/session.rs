//! gdbセッション
//!
//! gdbサブプロセスとその入力ストリームを排他的に所有する。
//! コマンドは1行書き込んで即フラッシュするだけで、応答は同期的に
//! 待たない。同一パイプ上で読み書きを交錯させるとデッドロックする
//! ため、出力の読み取りはリレータスク側だけが行う。

use crate::errors::SessionError;
use crate::relay::{self, RelayMessage};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

/// quit後にgdbの終了を待つ上限。超えたら強制終了する。
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// gdbセッション
///
/// 1回の実行につき1つ。プロセスが終了するか、shutdownが
/// 強制終了させた時点で破棄される。
pub struct GdbSession {
    child: Child,
    stdin: ChildStdin,
}

impl GdbSession {
    /// gdbを起動してセッションを開始する
    ///
    /// `<gdb> -se <symbol_file>` を3ストリームすべてパイプで起動し、
    /// stdout/stderrのリレータスクをセッションごとに1回だけ開始する。
    pub fn spawn(
        gdb: &str,
        symbol_file: &str,
    ) -> Result<(Self, UnboundedReceiver<RelayMessage>), SessionError> {
        let mut child = Command::new(gdb)
            .arg("-se")
            .arg(symbol_file)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SessionError::Spawn {
                gdb: gdb.to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or(SessionError::MissingStdio { stream: "stdin" })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(SessionError::MissingStdio { stream: "stdout" })?;
        let stderr = child
            .stderr
            .take()
            .ok_or(SessionError::MissingStdio { stream: "stderr" })?;

        debug!("spawned gdb (pid {:?}) with symbol file '{}'", child.id(), symbol_file);
        let messages = relay::spawn_readers(stdout, stderr);
        Ok((Self { child, stdin }, messages))
    }

    /// コマンドを1行送信して即フラッシュする
    ///
    /// 応答は待たない。gdbは入力キューのコマンドを厳密に順番どおり
    /// 実行するため、結果の到着順はコマンドの発行順と一致する。
    pub async fn send_command(&mut self, command: &str) -> Result<(), SessionError> {
        debug!("gdb <- {}", command);
        self.stdin
            .write_all(command.as_bytes())
            .await
            .map_err(SessionError::Write)?;
        self.stdin.write_all(b"\n").await.map_err(SessionError::Write)?;
        self.stdin.flush().await.map_err(SessionError::Write)?;
        Ok(())
    }

    /// セッションを終了する
    ///
    /// stdinを閉じて終了を待つ。上限時間内に終了しない場合は
    /// 強制終了する。
    pub async fn shutdown(mut self) -> Result<ExitStatus, SessionError> {
        drop(self.stdin);
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.child.wait()).await {
            Ok(status) => status.map_err(SessionError::Wait),
            Err(_) => {
                warn!("gdb did not exit within {:?}; killing it", SHUTDOWN_TIMEOUT);
                self.child.start_kill().map_err(SessionError::Wait)?;
                self.child.wait().await.map_err(SessionError::Wait)
            }
        }
    }
}
