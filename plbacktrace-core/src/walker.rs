//! 呼び出しレベルの再構成とコマンド順序付け（コア状態機械）
//!
//! ネイティブバックトレースを内側から外側へ読み進めながら、
//! 特定のC関数名に反応して追加のprintコマンドを発行し、
//! その結果3つ（行番号、fn_oid、シグネチャ）が揃うたびに
//! 1つのPL/pgSQL呼び出しレベルを完成させる。

use crate::call_level::CallLevel;
use crate::classify::LineClass;
use crate::command::GdbCommand;
use tracing::debug;

/// PL/pgSQL関数・トリガ呼び出しのエントリポイントとなるC関数名
const PL_ENTRY_FUNCTIONS: &[&str] = &["plpgsql_exec_function", "plpgsql_exec_trigger"];

/// PL/pgSQLの文実行関数のC関数名
const EXEC_STMT_FUNCTION: &str = "exec_stmt";

/// 1ステップの結果
#[derive(Debug, Default)]
pub struct StepOutcome {
    /// gdbへこの順で送信すべきコマンド
    pub commands: Vec<GdbCommand>,
    /// 完成した呼び出しレベルのレコード
    pub record: Option<CallLevel>,
}

impl StepOutcome {
    fn none() -> Self {
        Self::default()
    }

    fn send(commands: Vec<GdbCommand>) -> Self {
        Self {
            commands,
            record: None,
        }
    }

    fn emit(record: CallLevel) -> Self {
        Self {
            commands: Vec::new(),
            record: Some(record),
        }
    }
}

/// PL/pgSQLスタックウォーカー
///
/// 分類済みのgdb出力行を到着順に1行ずつ受け取る単一ライターの
/// 状態機械。printコマンドは各レベルにつき必ず
/// 行番号 → fn_oid → シグネチャ の固定順で発行され、gdbは入力
/// コマンドを厳密に順番どおり実行するため、結果の対応付けに
/// タグは不要である。
pub struct StackWalker {
    /// 収集途中のprint結果（長さは常に3未満で保たれる）
    pending: Vec<String>,
    /// 次のexec_stmtフレームで行番号を要求するかどうか
    awaiting_lineno: bool,
}

impl StackWalker {
    /// 初期状態のウォーカーを作成する
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            awaiting_lineno: true,
        }
    }

    /// 分類済みの1行で状態を進める
    pub fn step(&mut self, line: LineClass) -> StepOutcome {
        match line {
            LineClass::Frame { index, function } => self.on_frame(index, &function),
            LineClass::Value(value) => self.on_value(value),
            LineClass::Other => StepOutcome::none(),
        }
    }

    /// スタックフレーム行への反応を決める
    fn on_frame(&mut self, index: u32, function: &str) -> StepOutcome {
        if function == EXEC_STMT_FUNCTION {
            // 関数/トリガ入口の後、最初のexec_stmtだけが
            // そのレベルの現在行を持つ
            if !self.awaiting_lineno {
                return StepOutcome::none();
            }
            self.awaiting_lineno = false;
            debug!("exec_stmt at frame {}: requesting lineno", index);
            return StepOutcome::send(vec![
                GdbCommand::SelectFrame(index),
                GdbCommand::PrintStmtLineno,
            ]);
        }

        if PL_ENTRY_FUNCTIONS.contains(&function) {
            // 関数またはトリガの呼び出し。OIDとシグネチャを要求し、
            // 次の（=1つ外側のレベルの）exec_stmtを待つ
            self.awaiting_lineno = true;
            debug!("{} at frame {}: requesting fn_oid and signature", function, index);
            return StepOutcome::send(vec![
                GdbCommand::SelectFrame(index),
                GdbCommand::ListSource,
                GdbCommand::PrintFnOid,
                GdbCommand::PrintFnSignature,
            ]);
        }

        if function == "main" {
            // mainまで来たら必要なコマンドはすべてキュー済み。
            // quitを積めばgdbが終了し、ストリームが閉じてループも終わる
            debug!("reached main: sending quit");
            return StepOutcome::send(vec![GdbCommand::Quit]);
        }

        StepOutcome::none()
    }

    /// print結果を蓄積し、3つ揃ったらレコードを完成させる
    fn on_value(&mut self, value: String) -> StepOutcome {
        self.pending.push(value);
        if self.pending.len() < 3 {
            return StepOutcome::none();
        }

        // 固定順: [行番号, fn_oid, 生シグネチャ]
        let mut values = std::mem::take(&mut self.pending).into_iter();
        let (Some(lineno), Some(fn_oid), Some(raw_signature)) =
            (values.next(), values.next(), values.next())
        else {
            return StepOutcome::none();
        };

        let record = CallLevel::from_values(lineno, fn_oid, raw_signature);
        debug!("completed call level: {}", record);
        StepOutcome::emit(record)
    }
}

impl Default for StackWalker {
    fn default() -> Self {
        Self::new()
    }
}
