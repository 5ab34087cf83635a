//! plbacktrace CLI
//!
//! 実行中のPostgreSQLバックエンドのPL/pgSQL呼び出しレベルを、
//! gdbを介して関数OID・シグネチャ・現在行番号とともに表示する。

use anyhow::Result;
use clap::Parser;
use plbacktrace_core::{GdbCommand, LineClassifier, StackWalker};
use plbacktrace_gdb::{GdbSession, RelayMessage};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// plbacktrace - PL/pgSQL backtrace of a running PostgreSQL backend
#[derive(Parser)]
#[command(name = "plbacktrace")]
#[command(version = "0.1.0")]
#[command(about = "Display the PL/pgSQL call levels of a running PostgreSQL backend", long_about = None)]
struct Cli {
    /// Process ID of the backend to inspect
    pid: i32,

    /// gdb executable to drive
    #[arg(long, default_value = "gdb")]
    gdb: String,

    /// Symbol file passed to gdb (resolved by gdb itself)
    #[arg(long, default_value = "postgres")]
    symbol_file: String,
}

/// セッションの終わり方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionOutcome {
    /// stdoutが閉じた（正常終了。レコード0件も正常）
    Completed,
    /// 診断出力により中断（診断自体はすでにstderrへ中継済み）
    Aborted,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // ログはstderrへ。stdoutはレコード専用に保つ
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run_backtrace(&cli).await? {
        SessionOutcome::Completed => Ok(ExitCode::SUCCESS),
        SessionOutcome::Aborted => Ok(ExitCode::from(1)),
    }
}

/// gdbを起動し、バックトレースを駆動して呼び出しレベルを出力する
///
/// チャネルから届くメッセージを逐次処理する単一ループ。
/// ウォーカー状態を変更するのはこのループだけである。
async fn run_backtrace(cli: &Cli) -> Result<SessionOutcome> {
    let classifier = LineClassifier::new()?;
    let mut walker = StackWalker::new();

    let (mut session, mut messages) = GdbSession::spawn(&cli.gdb, &cli.symbol_file)?;

    // アタッチしてネイティブバックトレースを要求する。
    // 以降はgdb出力への応答だけでコマンドが決まる
    session
        .send_command(&GdbCommand::Attach(cli.pid).to_string())
        .await?;
    session
        .send_command(&GdbCommand::Backtrace.to_string())
        .await?;

    let outcome = loop {
        let message = match messages.recv().await {
            Some(message) => message,
            // リレータスクがすべて終了した
            None => break SessionOutcome::Completed,
        };

        match message {
            RelayMessage::Line(line) => {
                let step = walker.step(classifier.classify(&line));
                for command in &step.commands {
                    session.send_command(&command.to_string()).await?;
                }
                if let Some(record) = step.record {
                    println!("{}", record);
                }
            }
            RelayMessage::Eof => break SessionOutcome::Completed,
            RelayMessage::Abort => break SessionOutcome::Aborted,
        }
    };

    if let Err(e) = session.shutdown().await {
        warn!("failed to shut down gdb session: {}", e);
    }

    Ok(outcome)
}
