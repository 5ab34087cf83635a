//! plbacktrace のコアロジック
//!
//! このクレートは、gdbとの対話セッションを決定的な状態機械に変える
//! 中核部分を提供します。gdb出力行の分類、PL/pgSQL呼び出しレベルの
//! 再構成、追加コマンドの順序付けを行います。I/Oは含みません。

pub mod call_level;
pub mod classify;
pub mod command;
pub mod walker;

pub use call_level::CallLevel;
pub use classify::{LineClass, LineClassifier};
pub use command::GdbCommand;
pub use walker::{StackWalker, StepOutcome};

/// コアロジックの結果型
pub type Result<T> = anyhow::Result<T>;
